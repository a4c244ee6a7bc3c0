use crate::{BundleDocument, DecodedTransaction, ValidationError};
use alloy::primitives::{Keccak256, TxHash, B256};
use tracing::debug;

/// Parse a raw bundle document and validate it.
///
/// This is the only way (outside of tests) to obtain a [`Bundle`]. Checks run
/// in order: JSON shape, non-empty transaction list, positive block number,
/// transaction decoding and sender recovery, timestamp window. The first
/// failure is returned.
pub fn parse_and_validate(raw: &[u8]) -> Result<Bundle, ValidationError> {
    let bundle = BundleDocument::from_json_slice(raw)?.validate()?;
    debug!(
        bundle_hash = %bundle.bundle_hash(),
        block_number = bundle.block_number(),
        txs = bundle.len(),
        "validated bundle"
    );
    Ok(bundle)
}

/// A validated bundle.
///
/// Always holds at least one decoded transaction, a positive target block,
/// and a non-empty timestamp window. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    txs: Vec<DecodedTransaction>,
    block_number: u64,
    min_timestamp: Option<u64>,
    max_timestamp: Option<u64>,
    reverting_tx_hashes: Vec<TxHash>,
}

impl Bundle {
    /// Instantiator. Prefer [`parse_and_validate`] or
    /// [`BundleDocument::validate`]. This skips every check, including the
    /// non-empty check, and is used for testing.
    #[doc(hidden)]
    pub const fn new_unchecked(
        txs: Vec<DecodedTransaction>,
        block_number: u64,
        min_timestamp: Option<u64>,
        max_timestamp: Option<u64>,
        reverting_tx_hashes: Vec<TxHash>,
    ) -> Self {
        Self { txs, block_number, min_timestamp, max_timestamp, reverting_tx_hashes }
    }

    /// The transactions, in execution order.
    pub fn txs(&self) -> &[DecodedTransaction] {
        &self.txs
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Always false for a validated bundle.
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// The target block.
    pub const fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Earliest inclusion timestamp, if bounded.
    pub const fn min_timestamp(&self) -> Option<u64> {
        self.min_timestamp
    }

    /// Latest inclusion timestamp, if bounded.
    pub const fn max_timestamp(&self) -> Option<u64> {
        self.max_timestamp
    }

    /// Hashes of transactions allowed to revert.
    pub fn reverting_tx_hashes(&self) -> &[TxHash] {
        &self.reverting_tx_hashes
    }

    /// The inclusion window as an inclusive range, with unbounded ends
    /// widened to `0` and `u64::MAX`.
    pub fn valid_timestamp_range(&self) -> std::ops::RangeInclusive<u64> {
        let min = self.min_timestamp.unwrap_or(0);
        let max = self.max_timestamp.unwrap_or(u64::MAX);
        min..=max
    }

    /// True if a block with this timestamp may include the bundle.
    pub fn is_valid_at_timestamp(&self, timestamp: u64) -> bool {
        self.valid_timestamp_range().contains(&timestamp)
    }

    /// True if the transaction with this hash is allowed to revert.
    pub fn may_revert(&self, tx_hash: &TxHash) -> bool {
        self.reverting_tx_hashes.contains(tx_hash)
    }

    /// Keccak of the concatenated transaction hashes, in order.
    ///
    /// Matches the bundle hash returned by `eth_sendBundle`.
    pub fn bundle_hash(&self) -> B256 {
        let mut hasher = Keccak256::new();
        self.txs.iter().for_each(|tx| hasher.update(tx.hash()));
        hasher.finalize()
    }

    /// Convert back to a document. Validating the result yields an equal
    /// bundle.
    pub fn to_document(&self) -> BundleDocument {
        BundleDocument {
            txs: self
                .txs
                .iter()
                .map(|tx| alloy::hex::encode_prefixed(tx.encoded_2718()))
                .collect(),
            block_number: Some(self.block_number.into()),
            min_timestamp: self.min_timestamp,
            max_timestamp: self.max_timestamp,
            reverting_tx_hashes: self.reverting_tx_hashes.clone(),
        }
    }
}
