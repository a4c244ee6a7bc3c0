use alloy::{consensus::crypto::RecoveryError, eips::eip2718::Eip2718Error, hex::FromHexError};

/// Errors that can occur while decoding a single raw transaction.
#[derive(Debug, thiserror::Error)]
pub enum TxDecodeError {
    /// The transaction is not valid hex.
    #[error("invalid hex: {0}")]
    Hex(#[from] FromHexError),

    /// The bytes are not a valid EIP-2718 envelope.
    #[error(transparent)]
    Decoding(#[from] Eip2718Error),

    /// The signature does not recover to a sender.
    #[error(transparent)]
    Recovering(#[from] RecoveryError),

    /// Bytes were left over after the transaction.
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    /// Blob transactions cannot be simulated without their sidecars.
    #[error("blob transactions are not supported")]
    UnsupportedType,
}

/// Errors produced by [`parse_and_validate`], one per failed check.
///
/// Checks run in a fixed order and the first failure is returned, so the
/// variant identifies which check failed.
///
/// [`parse_and_validate`]: crate::parse_and_validate
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The input is not a JSON document.
    #[error("failed to parse bundle JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A field is present but has the wrong shape.
    #[error("invalid `{field}` field: {reason}")]
    Field {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Bundle has no transactions.
    #[error("bundle must contain at least one transaction")]
    EmptyBundle,

    /// No block number was given.
    #[error("block number must be specified")]
    MissingBlockNumber,

    /// The block number is zero or negative.
    #[error("block number must be a positive integer")]
    NonPositiveBlockNumber,

    /// A transaction could not be decoded or its sender recovered.
    #[error("invalid transaction at index {index}: {source}")]
    InvalidTransaction {
        /// Index of the transaction in the bundle.
        index: usize,
        /// Why it could not be decoded.
        #[source]
        source: TxDecodeError,
    },

    /// The inclusion window is empty.
    #[error("minTimestamp ({min}) cannot be greater than maxTimestamp ({max})")]
    TimestampWindow {
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },
}

impl ValidationError {
    /// Creates a new [`ValidationError::Field`].
    pub fn field(field: &'static str, reason: impl ToString) -> Self {
        Self::Field { field, reason: reason.to_string() }
    }

    /// Creates a new [`ValidationError::InvalidTransaction`].
    pub fn invalid_tx(index: usize, source: impl Into<TxDecodeError>) -> Self {
        Self::InvalidTransaction { index, source: source.into() }
    }

    /// The input document field this error relates to, if any.
    pub const fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::Malformed(_) => None,
            Self::Field { field, .. } => Some(field),
            Self::EmptyBundle | Self::InvalidTransaction { .. } => Some("txs"),
            Self::MissingBlockNumber | Self::NonPositiveBlockNumber => Some("blockNumber"),
            Self::TimestampWindow { .. } => Some("minTimestamp"),
        }
    }
}
