use alloy::primitives::Address;
use bundlesim_types::BlockHeader;
use serde::{Deserialize, Serialize};

/// The block context transactions execute in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEnv {
    /// Block number.
    pub number: u64,
    /// Block timestamp.
    pub timestamp: u64,
    /// Block gas limit.
    pub gas_limit: u64,
    /// EIP-1559 base fee, `None` before London.
    pub base_fee: Option<u64>,
    /// Fee recipient.
    pub beneficiary: Address,
}

impl From<&BlockHeader> for BlockEnv {
    fn from(header: &BlockHeader) -> Self {
        Self {
            number: header.number,
            timestamp: header.timestamp,
            gas_limit: header.gas_limit,
            base_fee: header.base_fee_per_gas,
            beneficiary: header.beneficiary,
        }
    }
}

impl BlockEnv {
    /// The base fee, `0` before London.
    pub fn base_fee(&self) -> u64 {
        self.base_fee.unwrap_or_default()
    }
}
