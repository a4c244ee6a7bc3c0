use alloy::primitives::{I256, U256};
use bundlesim_evm::ExecutionOutcome;

/// Accumulates gas and profit over a bundle's outcomes.
///
/// Profit is the simplified proxy `sum(gas_price * gas_used)`, in wei. It
/// ignores direct coinbase payments and base fee burn. The coinbase delta is
/// tracked separately for callers that want the beneficiary's view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfitAccountant {
    gas_used: u64,
    profit: I256,
    coinbase_diff: I256,
}

impl ProfitAccountant {
    /// An empty accountant.
    pub const fn new() -> Self {
        Self { gas_used: 0, profit: I256::ZERO, coinbase_diff: I256::ZERO }
    }

    /// Record one outcome, returning its gas fees.
    pub fn record(&mut self, outcome: &ExecutionOutcome) -> U256 {
        let fees = outcome.gas_fees();
        self.gas_used = self.gas_used.saturating_add(outcome.gas_used);
        self.profit = self.profit.saturating_add(I256::from_raw(fees));
        self.coinbase_diff = self.coinbase_diff.saturating_add(outcome.coinbase_diff);
        fees
    }

    /// Total gas used.
    pub const fn gas_used(&self) -> u64 {
        self.gas_used
    }

    /// Aggregate profit, in wei.
    pub const fn profit(&self) -> I256 {
        self.profit
    }

    /// Aggregate change in the beneficiary's balance, in wei.
    pub const fn coinbase_diff(&self) -> I256 {
        self.coinbase_diff
    }
}

impl<'a> Extend<&'a ExecutionOutcome> for ProfitAccountant {
    fn extend<T: IntoIterator<Item = &'a ExecutionOutcome>>(&mut self, iter: T) {
        iter.into_iter().for_each(|outcome| {
            self.record(outcome);
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy::primitives::{Address, Bytes, TxHash};
    use bundlesim_evm::{ExecutionStatus, PreconditionFailure};

    fn outcome(gas_used: u64, gas_price: u128) -> ExecutionOutcome {
        ExecutionOutcome {
            tx_hash: TxHash::ZERO,
            from: Address::ZERO,
            status: ExecutionStatus::Success,
            gas_used,
            gas_price,
            logs: vec![],
            output: Bytes::new(),
            revert_reason: None,
            coinbase_diff: I256::try_from(gas_used).unwrap(),
        }
    }

    #[test]
    fn sums_gas_fees() {
        let outcomes = [outcome(21_000, 2), outcome(50_000, 3)];
        let mut accountant = ProfitAccountant::new();
        accountant.extend(&outcomes);
        assert_eq!(accountant.profit(), I256::try_from(21_000 * 2 + 50_000 * 3).unwrap());
        assert_eq!(accountant.gas_used(), 71_000);
        assert_eq!(accountant.coinbase_diff(), I256::try_from(71_000).unwrap());
    }

    #[test]
    fn precondition_failures_are_free() {
        let failed = ExecutionOutcome::precondition_failed(
            TxHash::ZERO,
            Address::ZERO,
            100,
            PreconditionFailure::NonceMismatch { expected: 1, got: 0 },
        );
        let mut accountant = ProfitAccountant::new();
        assert_eq!(accountant.record(&failed), U256::ZERO);
        assert_eq!(accountant.profit(), I256::ZERO);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(ProfitAccountant::new(), ProfitAccountant::default());
        assert_eq!(ProfitAccountant::new().profit(), I256::ZERO);
    }
}
