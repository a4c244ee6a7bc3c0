use crate::{serde_decimal, ProfitAccountant};
use alloy::primitives::{Address, Log, TxHash, B256, I256, U256};
use bundlesim_bundle::Bundle;
use bundlesim_evm::{ExecutionOutcome, PreconditionFailure};
use serde::{Deserialize, Serialize};

/// One transaction's entry in a [`SimulationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReport {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Sender.
    pub from: Address,
    /// `success`, `reverted` or `failedPrecondition`.
    pub status: String,
    /// Gas consumed.
    pub gas_used: u64,
    /// Effective gas price, in wei.
    #[serde(with = "serde_decimal")]
    pub gas_price: u128,
    /// `gas_price * gas_used`, in wei.
    #[serde(with = "serde_decimal")]
    pub gas_fees: U256,
    /// Change in the beneficiary's balance, in wei.
    #[serde(with = "serde_decimal")]
    pub coinbase_diff: I256,
    /// Decoded revert reason, if reverted.
    pub revert_reason: Option<String>,
    /// Why the transaction was not executed, if it wasn't.
    pub failure: Option<PreconditionFailure>,
    /// Logs emitted.
    pub logs: Vec<Log>,
}

impl From<&ExecutionOutcome> for TxReport {
    fn from(outcome: &ExecutionOutcome) -> Self {
        Self {
            tx_hash: outcome.tx_hash,
            from: outcome.from,
            status: outcome.status.as_str().to_string(),
            gas_used: outcome.gas_used,
            gas_price: outcome.gas_price,
            gas_fees: outcome.gas_fees(),
            coinbase_diff: outcome.coinbase_diff,
            revert_reason: outcome.revert_reason.clone(),
            failure: outcome.failure().cloned(),
            logs: outcome.logs.clone(),
        }
    }
}

/// The result of simulating one bundle.
///
/// Serializes deterministically: the same bundle against the same state
/// produces byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// True if every transaction executed, and any that reverted were
    /// allowed to.
    pub success: bool,
    /// Keccak of the concatenated transaction hashes.
    pub bundle_hash: B256,
    /// The target block.
    pub block_number: u64,
    /// The height state was read at.
    pub state_block_number: u64,
    /// Sum of gas used over executed transactions.
    pub total_gas_used: u64,
    /// `sum(gas_price * gas_used)`, in wei.
    #[serde(with = "serde_decimal")]
    pub profit: I256,
    /// Change in the beneficiary's balance, in wei.
    #[serde(with = "serde_decimal")]
    pub coinbase_diff: I256,
    /// Per-transaction results, in execution order. Stops at the first
    /// disallowed failure.
    pub results: Vec<TxReport>,
    /// Why the bundle failed, if it did.
    pub error: Option<String>,
}

impl SimulationReport {
    /// Build a report from the collected outcomes. The report is successful
    /// iff `error` is `None`.
    pub fn new(
        bundle: &Bundle,
        state_block_number: u64,
        outcomes: &[ExecutionOutcome],
        error: Option<String>,
    ) -> Self {
        let mut accountant = ProfitAccountant::new();
        let results = outcomes
            .iter()
            .map(|outcome| {
                accountant.record(outcome);
                TxReport::from(outcome)
            })
            .collect();

        Self {
            success: error.is_none(),
            bundle_hash: bundle.bundle_hash(),
            block_number: bundle.block_number(),
            state_block_number,
            total_gas_used: accountant.gas_used(),
            profit: accountant.profit(),
            coinbase_diff: accountant.coinbase_diff(),
            results,
            error,
        }
    }

    /// A failed report for a bundle that was not executed at all.
    pub fn rejected(bundle: &Bundle, state_block_number: u64, error: impl Into<String>) -> Self {
        Self::new(bundle, state_block_number, &[], Some(error.into()))
    }

    /// Compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
