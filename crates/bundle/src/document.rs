use crate::{Bundle, DecodedTransaction, ValidationError};
use alloy::{
    eips::Encodable2718,
    primitives::{TxHash, B256},
    rpc::types::mev::EthSendBundle,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// The block number field of a bundle document.
///
/// Relays disagree on the encoding, so decimal strings, `0x`-prefixed hex
/// strings and bare JSON integers are all accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockNumberField {
    /// A JSON string, decimal or `0x` hex.
    Text(String),
    /// A JSON number.
    Number(serde_json::Number),
}

impl From<u64> for BlockNumberField {
    fn from(number: u64) -> Self {
        Self::Number(number.into())
    }
}

impl BlockNumberField {
    /// Resolve to a positive block number.
    pub fn resolve(&self) -> Result<u64, ValidationError> {
        let number = match self {
            Self::Text(text) => {
                let text = text.trim();
                if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    u64::from_str_radix(hex, 16).map(i128::from)
                } else {
                    text.parse::<i128>()
                }
                .map_err(|_| ValidationError::field("blockNumber", "invalid block number"))?
            }
            Self::Number(number) => number
                .as_i64()
                .map(i128::from)
                .or_else(|| number.as_u64().map(i128::from))
                .ok_or_else(|| ValidationError::field("blockNumber", "invalid block number"))?,
        };

        if number <= 0 {
            return Err(ValidationError::NonPositiveBlockNumber);
        }
        u64::try_from(number)
            .map_err(|_| ValidationError::field("blockNumber", "block number out of range"))
    }
}

/// A bundle as submitted, before any validation beyond JSON shape.
///
/// Follows the `eth_sendBundle` request layout used by Flashbots and most
/// builders. See [their docs].
///
/// [their docs]: https://docs.flashbots.net/flashbots-auction/advanced/rpc-endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDocument {
    /// Hex-encoded EIP-2718 transactions, in execution order.
    #[serde(default)]
    pub txs: Vec<String>,
    /// Target block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<BlockNumberField>,
    /// Earliest inclusion timestamp. `0` or absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_timestamp: Option<u64>,
    /// Latest inclusion timestamp. `0` or absent means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timestamp: Option<u64>,
    /// Hashes of transactions that are allowed to revert.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reverting_tx_hashes: Vec<TxHash>,
}

impl From<EthSendBundle> for BundleDocument {
    fn from(bundle: EthSendBundle) -> Self {
        Self {
            txs: bundle.txs.iter().map(alloy::hex::encode_prefixed).collect(),
            block_number: Some(bundle.block_number.into()),
            min_timestamp: bundle.min_timestamp,
            max_timestamp: bundle.max_timestamp,
            reverting_tx_hashes: bundle.reverting_tx_hashes,
        }
    }
}

/// Pull a single field out of the document map, attributing any shape error
/// to the field by name. `null` and absent are treated alike.
fn take<T: DeserializeOwned + Default>(
    map: &mut Map<String, Value>,
    field: &'static str,
) -> Result<T, ValidationError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| ValidationError::field(field, e)),
    }
}

impl BundleDocument {
    /// Create a document targeting `block_number`, with no transactions.
    pub fn new(block_number: u64) -> Self {
        Self { block_number: Some(block_number.into()), ..Default::default() }
    }

    /// Append a transaction, hex encoding it.
    pub fn append_2718_tx(mut self, tx: impl Encodable2718) -> Self {
        self.txs.push(alloy::hex::encode_prefixed(tx.encoded_2718()));
        self
    }

    /// Append an already hex-encoded transaction.
    pub fn append_raw_tx(mut self, tx: impl Into<String>) -> Self {
        self.txs.push(tx.into());
        self
    }

    /// Set the inclusion window.
    pub const fn with_timestamps(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_timestamp = min;
        self.max_timestamp = max;
        self
    }

    /// Allow a transaction to revert.
    pub fn with_reverting_tx_hash(mut self, hash: B256) -> Self {
        self.reverting_tx_hashes.push(hash);
        self
    }

    /// Parse a document from JSON. Only the shape is checked here. Unknown
    /// fields are ignored.
    pub fn from_json_slice(raw: &[u8]) -> Result<Self, ValidationError> {
        let mut map: Map<String, Value> =
            serde_json::from_slice(raw).map_err(ValidationError::Malformed)?;

        Ok(Self {
            txs: take(&mut map, "txs")?,
            block_number: take(&mut map, "blockNumber")?,
            min_timestamp: take(&mut map, "minTimestamp")?,
            max_timestamp: take(&mut map, "maxTimestamp")?,
            reverting_tx_hashes: take(&mut map, "revertingTxHashes")?,
        })
    }

    /// Run the validation checks in order, producing a [`Bundle`]:
    ///
    /// 1. at least one transaction,
    /// 2. a positive block number,
    /// 3. every transaction decodes and has a recoverable sender,
    /// 4. `minTimestamp <= maxTimestamp` when both are bounded.
    ///
    /// The first failing check is reported.
    pub fn validate(&self) -> Result<Bundle, ValidationError> {
        if self.txs.is_empty() {
            return Err(ValidationError::EmptyBundle);
        }

        let block_number =
            self.block_number.as_ref().ok_or(ValidationError::MissingBlockNumber)?.resolve()?;

        let txs = self
            .txs
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                DecodedTransaction::decode_hex(raw)
                    .map_err(|err| ValidationError::invalid_tx(index, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let min_timestamp = self.min_timestamp.filter(|ts| *ts != 0);
        let max_timestamp = self.max_timestamp.filter(|ts| *ts != 0);
        if let (Some(min), Some(max)) = (min_timestamp, max_timestamp) {
            if min > max {
                return Err(ValidationError::TimestampWindow { min, max });
            }
        }

        Ok(Bundle::new_unchecked(
            txs,
            block_number,
            min_timestamp,
            max_timestamp,
            self.reverting_tx_hashes.clone(),
        ))
    }
}
