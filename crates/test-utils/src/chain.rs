use crate::users::TEST_USERS;
use alloy::{
    consensus::constants::GWEI_TO_WEI,
    primitives::{bytes, uint, Address, Bytes, U256},
};
use bundlesim_types::{AccountInfo, BlockHeader, InMemoryAccessor};

/// Chain id signed into test transactions.
pub const TEST_CHAIN_ID: u64 = 1;

/// The block test bundles target.
pub const TARGET_BLOCK: u64 = 100;

/// The block state is read at by default.
pub const PARENT_BLOCK: u64 = TARGET_BLOCK - 1;

/// Timestamp of [`TARGET_BLOCK`].
pub const TARGET_TIMESTAMP: u64 = 1_700_000_012;

/// Base fee of [`TARGET_BLOCK`].
pub const TEST_BASE_FEE: u64 = GWEI_TO_WEI;

/// Beneficiary of [`TARGET_BLOCK`].
pub const TEST_BENEFICIARY: Address = Address::repeat_byte(0x81);

/// Balance of every [`TEST_USERS`] account.
pub const STARTING_BALANCE: U256 = uint!(1_000_000_000_000_000_000_000_U256);

/// An account with code, for the scripted VM to act as.
pub const COUNTER_ADDRESS: Address = Address::repeat_byte(0xc0);

/// A second account with code.
pub const REVERTER_ADDRESS: Address = Address::repeat_byte(0xc1);

/// Placeholder runtime code. The scripted VM never looks at it.
pub const CONTRACT_CODE: Bytes = bytes!("600160005500");

/// The header of [`TARGET_BLOCK`].
pub fn target_header() -> BlockHeader {
    BlockHeader::new(TARGET_BLOCK, TARGET_TIMESTAMP)
        .with_base_fee(TEST_BASE_FEE)
        .with_beneficiary(TEST_BENEFICIARY)
}

/// The header of [`PARENT_BLOCK`].
pub fn parent_header() -> BlockHeader {
    BlockHeader::new(PARENT_BLOCK, TARGET_TIMESTAMP - 12)
        .with_base_fee(TEST_BASE_FEE)
        .with_beneficiary(TEST_BENEFICIARY)
}

/// An accessor knowing both test headers, with every test user funded and
/// code at [`COUNTER_ADDRESS`] and [`REVERTER_ADDRESS`].
pub fn test_accessor() -> InMemoryAccessor {
    let accessor = TEST_USERS
        .iter()
        .fold(InMemoryAccessor::new(), |accessor, user| {
            accessor.with_account(*user, AccountInfo::with_balance(STARTING_BALANCE))
        })
        .with_header(parent_header())
        .with_header(target_header());

    [COUNTER_ADDRESS, REVERTER_ADDRESS].into_iter().fold(accessor, |accessor, address| {
        accessor.with_account(address, AccountInfo::default().code(CONTRACT_CODE))
    })
}
