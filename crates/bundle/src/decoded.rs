use crate::TxDecodeError;
use alloy::{
    consensus::{
        transaction::{Recovered, SignerRecoverable},
        Transaction, TxEnvelope,
    },
    eips::{eip2930::AccessList, Decodable2718, Encodable2718},
    primitives::{Address, Bytes, TxHash, TxKind, U256},
};

/// A signed transaction with its sender recovered.
///
/// Decoding happens once, at validation time. Everything downstream works
/// from this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    inner: Recovered<TxEnvelope>,
}

impl From<Recovered<TxEnvelope>> for DecodedTransaction {
    fn from(inner: Recovered<TxEnvelope>) -> Self {
        Self { inner }
    }
}

impl DecodedTransaction {
    /// Decode a `0x`-prefixed (or bare) hex string holding an EIP-2718
    /// encoded transaction.
    pub fn decode_hex(raw: &str) -> Result<Self, TxDecodeError> {
        let bytes = alloy::hex::decode(raw.trim())?;
        Self::decode_2718(&bytes)
    }

    /// Decode EIP-2718 bytes and recover the sender. The input must hold
    /// exactly one transaction.
    pub fn decode_2718(mut bytes: &[u8]) -> Result<Self, TxDecodeError> {
        let envelope = TxEnvelope::decode_2718(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(TxDecodeError::TrailingBytes(bytes.len()));
        }
        if envelope.is_eip4844() {
            return Err(TxDecodeError::UnsupportedType);
        }
        envelope.try_into_recovered().map(Self::from).map_err(Into::into)
    }

    /// The transaction hash.
    pub fn hash(&self) -> TxHash {
        *self.inner.inner().tx_hash()
    }

    /// The recovered sender.
    pub fn sender(&self) -> Address {
        self.inner.signer()
    }

    /// The signed envelope.
    pub fn envelope(&self) -> &TxEnvelope {
        self.inner.inner()
    }

    /// Re-encode the transaction as EIP-2718 bytes.
    pub fn encoded_2718(&self) -> Bytes {
        self.envelope().encoded_2718().into()
    }

    /// The sender's nonce for this transaction.
    pub fn nonce(&self) -> u64 {
        self.envelope().nonce()
    }

    /// The gas limit.
    pub fn gas_limit(&self) -> u64 {
        self.envelope().gas_limit()
    }

    /// Call or create.
    pub fn kind(&self) -> TxKind {
        self.envelope().kind()
    }

    /// The recipient, `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        self.envelope().to()
    }

    /// True if this transaction deploys a contract.
    pub fn is_create(&self) -> bool {
        self.kind().is_create()
    }

    /// The value transferred.
    pub fn value(&self) -> U256 {
        self.envelope().value()
    }

    /// Calldata, or initcode for a creation.
    pub fn input(&self) -> &Bytes {
        self.envelope().input()
    }

    /// The fee cap. For legacy and EIP-2930 transactions this is the gas
    /// price.
    pub fn max_fee_per_gas(&self) -> u128 {
        self.envelope().max_fee_per_gas()
    }

    /// The priority fee cap, `None` for legacy and EIP-2930 transactions.
    pub fn max_priority_fee_per_gas(&self) -> Option<u128> {
        self.envelope().max_priority_fee_per_gas()
    }

    /// The price per gas actually paid given a base fee:
    /// `min(max_fee, base_fee + priority_fee)`, or the gas price for legacy
    /// transactions.
    pub fn effective_gas_price(&self, base_fee: Option<u64>) -> u128 {
        self.envelope().effective_gas_price(base_fee)
    }

    /// The access list, empty for legacy transactions.
    pub fn access_list(&self) -> Option<&AccessList> {
        self.envelope().access_list()
    }

    /// The most the sender can be charged: `max_fee_per_gas * gas_limit +
    /// value`.
    pub fn max_cost(&self) -> U256 {
        U256::from(self.max_fee_per_gas())
            .saturating_mul(U256::from(self.gas_limit()))
            .saturating_add(self.value())
    }

}
