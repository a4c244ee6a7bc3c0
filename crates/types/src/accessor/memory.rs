use crate::{AccessorError, AccountInfo, BlockHeader, ChainStateAccessor};
use alloy::{
    genesis::GenesisAccount,
    primitives::{Address, U256},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::trace;

/// A JSON-loadable description of chain state, used to run simulations
/// without a node.
///
/// Accounts use the genesis `alloc` format, so existing genesis files and
/// state dumps can be reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFixture {
    /// Known block headers.
    #[serde(default)]
    pub headers: Vec<BlockHeader>,
    /// Account state, keyed by address.
    #[serde(default)]
    pub alloc: BTreeMap<Address, GenesisAccount>,
}

/// An in-memory [`ChainStateAccessor`].
///
/// State is height-agnostic: every height sees the same accounts and storage.
/// Headers are looked up by number. Counts reads, so tests can assert on
/// copy-on-write behavior.
#[derive(Debug, Default)]
pub struct InMemoryAccessor {
    headers: BTreeMap<u64, BlockHeader>,
    accounts: HashMap<Address, AccountInfo>,
    storage: HashMap<(Address, U256), U256>,
    failing: HashSet<Address>,
    account_reads: AtomicUsize,
    storage_reads: AtomicUsize,
}

impl InMemoryAccessor {
    /// Create an empty accessor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an accessor from a [`StateFixture`].
    pub fn from_fixture(fixture: StateFixture) -> Self {
        let mut this = Self::new();
        for header in fixture.headers {
            this.insert_header(header);
        }
        for (address, account) in fixture.alloc {
            let info = AccountInfo {
                balance: account.balance,
                nonce: account.nonce.unwrap_or_default(),
                code: account.code.unwrap_or_default(),
            };
            this.insert_account(address, info);
            for (slot, value) in account.storage.unwrap_or_default() {
                let (slot, value) = (U256::from_be_bytes(slot.0), U256::from_be_bytes(value.0));
                this.insert_storage(address, slot, value);
            }
        }
        this
    }

    /// Parse a JSON [`StateFixture`] and build an accessor from it.
    pub fn from_json_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json).map(Self::from_fixture)
    }

    /// Insert a header.
    pub fn insert_header(&mut self, header: BlockHeader) {
        self.headers.insert(header.number, header);
    }

    /// Insert or replace an account.
    pub fn insert_account(&mut self, address: Address, info: AccountInfo) {
        self.accounts.insert(address, info);
    }

    /// Set a storage slot.
    pub fn insert_storage(&mut self, address: Address, slot: U256, value: U256) {
        self.storage.insert((address, slot), value);
    }

    /// Make every read touching `address` fail with a transport error.
    pub fn insert_failing(&mut self, address: Address) {
        self.failing.insert(address);
    }

    /// Builder form of [`Self::insert_header`].
    pub fn with_header(mut self, header: BlockHeader) -> Self {
        self.insert_header(header);
        self
    }

    /// Builder form of [`Self::insert_account`].
    pub fn with_account(mut self, address: Address, info: AccountInfo) -> Self {
        self.insert_account(address, info);
        self
    }

    /// Builder form of [`Self::insert_storage`].
    pub fn with_storage(mut self, address: Address, slot: U256, value: U256) -> Self {
        self.insert_storage(address, slot, value);
        self
    }

    /// Builder form of [`Self::insert_failing`].
    pub fn with_failing(mut self, address: Address) -> Self {
        self.insert_failing(address);
        self
    }

    /// Number of account reads served so far.
    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::Relaxed)
    }

    /// Number of storage reads served so far.
    pub fn storage_reads(&self) -> usize {
        self.storage_reads.load(Ordering::Relaxed)
    }

    fn check_failing(&self, address: Address) -> Result<(), AccessorError> {
        if self.failing.contains(&address) {
            return Err(AccessorError::transport(format!("injected failure for {address}")));
        }
        Ok(())
    }
}

impl ChainStateAccessor for InMemoryAccessor {
    async fn block_header(&self, number: u64) -> Result<BlockHeader, AccessorError> {
        self.headers.get(&number).copied().ok_or(AccessorError::BlockNotFound(number))
    }

    async fn account(&self, address: Address, at_block: u64) -> Result<AccountInfo, AccessorError> {
        self.account_reads.fetch_add(1, Ordering::Relaxed);
        trace!(%address, at_block, "in-memory account read");
        self.check_failing(address)?;
        Ok(self.accounts.get(&address).cloned().unwrap_or_default())
    }

    async fn storage(
        &self,
        address: Address,
        slot: U256,
        at_block: u64,
    ) -> Result<U256, AccessorError> {
        self.storage_reads.fetch_add(1, Ordering::Relaxed);
        trace!(%address, %slot, at_block, "in-memory storage read");
        self.check_failing(address)?;
        Ok(self.storage.get(&(address, slot)).copied().unwrap_or_default())
    }
}
