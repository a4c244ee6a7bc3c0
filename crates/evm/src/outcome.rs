use alloy::primitives::{Address, Bytes, Log, TxHash, I256, U256};
use serde::{Deserialize, Serialize};

/// Why a transaction could not be executed.
///
/// A transaction failing a precondition consumes no gas and leaves the
/// snapshot untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PreconditionFailure {
    /// The sender's nonce does not match the transaction.
    #[error("nonce mismatch: account nonce {expected}, transaction nonce {got}")]
    NonceMismatch {
        /// The sender's current nonce.
        expected: u64,
        /// The transaction's nonce.
        got: u64,
    },

    /// The fee cap is below the block base fee.
    #[error("fee cap {max_fee} below base fee {base_fee}")]
    FeeCapTooLow {
        /// The transaction's fee cap.
        max_fee: u128,
        /// The block base fee.
        base_fee: u64,
    },

    /// The priority fee cap exceeds the fee cap.
    #[error("priority fee {max_priority_fee} above fee cap {max_fee}")]
    TipAboveFeeCap {
        /// The transaction's priority fee cap.
        max_priority_fee: u128,
        /// The transaction's fee cap.
        max_fee: u128,
    },

    /// The gas limit does not cover intrinsic gas.
    #[error("intrinsic gas {intrinsic} exceeds gas limit {gas_limit}")]
    IntrinsicGasTooLow {
        /// Gas required before any code runs.
        intrinsic: u64,
        /// The transaction's gas limit.
        gas_limit: u64,
    },

    /// The sender cannot cover `value + gas_limit * max_fee`.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// The sender's balance.
        balance: U256,
        /// What the transaction may cost.
        required: U256,
    },
}

/// Result status of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Executed and succeeded.
    Success,
    /// Executed, but reverted or halted. Gas was charged and the nonce
    /// bumped, all other effects were discarded.
    Reverted,
    /// Not executed.
    FailedPrecondition(PreconditionFailure),
}

impl ExecutionStatus {
    /// The status name used in reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Reverted => "reverted",
            Self::FailedPrecondition(_) => "failedPrecondition",
        }
    }
}

impl core::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FailedPrecondition(failure) => write!(f, "{}: {failure}", self.as_str()),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// The outcome of applying one transaction to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Sender.
    pub from: Address,
    /// What happened.
    pub status: ExecutionStatus,
    /// Gas consumed, never above the gas limit.
    pub gas_used: u64,
    /// Effective price paid per unit of gas.
    pub gas_price: u128,
    /// Logs, in emission order. Empty unless successful.
    pub logs: Vec<Log>,
    /// Return data, or revert data.
    pub output: Bytes,
    /// Decoded revert reason. Present iff the status is
    /// [`ExecutionStatus::Reverted`].
    pub revert_reason: Option<String>,
    /// Change in the block beneficiary's balance caused by this transaction.
    pub coinbase_diff: I256,
}

impl ExecutionOutcome {
    /// An outcome for a transaction that was not executed.
    pub const fn precondition_failed(
        tx_hash: TxHash,
        from: Address,
        gas_price: u128,
        failure: PreconditionFailure,
    ) -> Self {
        Self {
            tx_hash,
            from,
            status: ExecutionStatus::FailedPrecondition(failure),
            gas_used: 0,
            gas_price,
            logs: Vec::new(),
            output: Bytes::new(),
            revert_reason: None,
            coinbase_diff: I256::ZERO,
        }
    }

    /// True if the transaction succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success)
    }

    /// True if the transaction reverted.
    pub const fn is_reverted(&self) -> bool {
        matches!(self.status, ExecutionStatus::Reverted)
    }

    /// The precondition failure, if any.
    pub const fn failure(&self) -> Option<&PreconditionFailure> {
        match &self.status {
            ExecutionStatus::FailedPrecondition(failure) => Some(failure),
            _ => None,
        }
    }

    /// `gas_price * gas_used`, in wei.
    pub fn gas_fees(&self) -> U256 {
        U256::from(self.gas_price) * U256::from(self.gas_used)
    }
}
