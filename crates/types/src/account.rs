use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Account state as read from the chain at a fixed height.
///
/// Partially modeled after [`revm::AccountInfo`], but carries the code
/// itself rather than a hash, since the snapshot needs it to decide whether a
/// call runs contract code.
///
/// [`revm::AccountInfo`]: https://docs.rs/revm-state/latest/revm_state/struct.AccountInfo.html
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Balance in wei.
    pub balance: U256,
    /// The next expected nonce. `0` for an address that has never sent a
    /// transaction.
    pub nonce: u64,
    /// Deployed bytecode. Empty for externally owned accounts.
    #[serde(default)]
    pub code: Bytes,
}

impl AccountInfo {
    /// Create an account with the given balance, zero nonce and no code.
    pub const fn with_balance(balance: U256) -> Self {
        Self { balance, nonce: 0, code: Bytes::new() }
    }

    /// Set the nonce.
    pub const fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the code.
    pub fn code(mut self, code: impl Into<Bytes>) -> Self {
        self.code = code.into();
        self
    }

    /// True if the account has deployed code.
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// True if this is the zero-value account: no balance, no nonce, no code.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
    }
}

/// The subset of a block header needed to build an execution context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,
    /// Block hash.
    #[serde(default)]
    pub hash: B256,
    /// Parent block hash.
    #[serde(default)]
    pub parent_hash: B256,
    /// Unix timestamp, in seconds.
    pub timestamp: u64,
    /// Block gas limit.
    #[serde(default)]
    pub gas_limit: u64,
    /// EIP-1559 base fee. `None` for pre-London blocks.
    #[serde(default)]
    pub base_fee_per_gas: Option<u64>,
    /// Fee recipient (coinbase).
    #[serde(default)]
    pub beneficiary: Address,
}

impl BlockHeader {
    /// Create a header with the given number and timestamp, and defaults for
    /// everything else.
    pub fn new(number: u64, timestamp: u64) -> Self {
        Self { number, timestamp, ..Default::default() }
    }

    /// Set the base fee.
    pub const fn with_base_fee(mut self, base_fee: u64) -> Self {
        self.base_fee_per_gas = Some(base_fee);
        self
    }

    /// Set the beneficiary.
    pub const fn with_beneficiary(mut self, beneficiary: Address) -> Self {
        self.beneficiary = beneficiary;
        self
    }

    /// The base fee, with `0` for pre-London blocks.
    pub fn base_fee(&self) -> u64 {
        self.base_fee_per_gas.unwrap_or_default()
    }
}
