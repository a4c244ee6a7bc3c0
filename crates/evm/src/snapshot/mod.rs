mod cell;
use cell::Cell;

use alloy::primitives::{Address, Bytes, U256};
use bundlesim_types::{AccessorError, AccountInfo, ChainStateAccessor};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::trace;

#[derive(Debug, Default)]
struct AccountOverlay {
    balance: Cell<U256>,
    nonce: Cell<u64>,
    code: Cell<Bytes>,
    storage: HashMap<U256, Cell<U256>>,
}

impl AccountOverlay {
    const fn needs_load(&self) -> bool {
        self.balance.is_unloaded() || self.nonce.is_unloaded() || self.code.is_unloaded()
    }

    fn fill(&mut self, info: AccountInfo) {
        self.balance.load(info.balance);
        self.nonce.load(info.nonce);
        self.code.load(info.code);
    }

    fn info(&self) -> AccountInfo {
        AccountInfo {
            balance: self.balance.get().copied().unwrap_or_default(),
            nonce: self.nonce.get().copied().unwrap_or_default(),
            code: self.code.get().cloned().unwrap_or_default(),
        }
    }

    fn is_dirty(&self) -> bool {
        self.balance.written().is_some()
            || self.nonce.written().is_some()
            || self.code.written().is_some()
            || self.storage.values().any(|cell| cell.written().is_some())
    }
}

/// A prior overlay value, restored on revert.
#[derive(Debug)]
enum JournalEntry {
    Balance(Address, Cell<U256>),
    Nonce(Address, Cell<u64>),
    Code(Address, Cell<Bytes>),
    Storage(Address, U256, Cell<U256>),
}

/// A point in the write journal that the snapshot can be reverted to.
///
/// Checkpoints nest. Each must be passed to exactly one of
/// [`StateSnapshot::revert_to`] or [`StateSnapshot::commit`], innermost
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a checkpoint must be committed or reverted"]
pub struct Checkpoint {
    journal_len: usize,
    depth: usize,
}

/// The writes a snapshot holds for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDiff {
    /// Written balance.
    pub balance: Option<U256>,
    /// Written nonce.
    pub nonce: Option<u64>,
    /// Written code.
    pub code: Option<Bytes>,
    /// Written storage slots.
    pub storage: BTreeMap<U256, U256>,
}

/// A copy-on-write view of chain state at a fixed height.
///
/// Reads hit the overlay first and fall back to the accessor, caching what
/// they fetch. Writes only touch the overlay. Once a value has been read or
/// written, later reads see the overlay value and the accessor is not asked
/// again.
///
/// A snapshot belongs to a single simulation run and is dropped with it.
#[derive(Debug)]
pub struct StateSnapshot<A> {
    accessor: A,
    block: u64,
    accounts: HashMap<Address, AccountOverlay>,
    journal: Vec<JournalEntry>,
    depth: usize,
}

impl<A: ChainStateAccessor> StateSnapshot<A> {
    /// Fork a snapshot at `block`. Nothing is fetched until first read.
    pub fn fork_from(accessor: A, block: u64) -> Self {
        Self { accessor, block, accounts: HashMap::new(), journal: Vec::new(), depth: 0 }
    }

    /// The height state is read at.
    pub const fn block(&self) -> u64 {
        self.block
    }

    /// The underlying accessor.
    pub const fn accessor(&self) -> &A {
        &self.accessor
    }

    async fn load_account(&mut self, address: Address) -> Result<&AccountOverlay, AccessorError> {
        if self.accounts.get(&address).is_none_or(AccountOverlay::needs_load) {
            trace!(%address, block = self.block, "loading account");
            let info = self.accessor.account(address, self.block).await?;
            self.accounts.entry(address).or_default().fill(info);
        }
        Ok(self.accounts.entry(address).or_default())
    }

    /// The account as currently seen by this snapshot.
    pub async fn account(&mut self, address: Address) -> Result<AccountInfo, AccessorError> {
        self.load_account(address).await.map(AccountOverlay::info)
    }

    /// Balance of `address`.
    pub async fn balance(&mut self, address: Address) -> Result<U256, AccessorError> {
        let account = self.load_account(address).await?;
        Ok(account.balance.get().copied().unwrap_or_default())
    }

    /// Nonce of `address`.
    pub async fn nonce(&mut self, address: Address) -> Result<u64, AccessorError> {
        let account = self.load_account(address).await?;
        Ok(account.nonce.get().copied().unwrap_or_default())
    }

    /// Code of `address`. Empty for externally owned accounts.
    pub async fn code(&mut self, address: Address) -> Result<Bytes, AccessorError> {
        let account = self.load_account(address).await?;
        Ok(account.code.get().cloned().unwrap_or_default())
    }

    /// A storage slot of `address`.
    pub async fn storage(&mut self, address: Address, slot: U256) -> Result<U256, AccessorError> {
        let cached = self
            .accounts
            .get(&address)
            .and_then(|account| account.storage.get(&slot))
            .and_then(Cell::get)
            .copied();
        if let Some(value) = cached {
            return Ok(value);
        }

        trace!(%address, %slot, block = self.block, "loading storage");
        let value = self.accessor.storage(address, slot, self.block).await?;
        self.accounts.entry(address).or_default().storage.entry(slot).or_default().load(value);
        Ok(value)
    }

    fn record(&mut self, entry: JournalEntry) {
        if self.depth > 0 {
            self.journal.push(entry);
        }
    }

    /// Overwrite the balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        let account = self.accounts.entry(address).or_default();
        let prev = core::mem::replace(&mut account.balance, Cell::Written(balance));
        self.record(JournalEntry::Balance(address, prev));
    }

    /// Overwrite the nonce of `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        let account = self.accounts.entry(address).or_default();
        let prev = core::mem::replace(&mut account.nonce, Cell::Written(nonce));
        self.record(JournalEntry::Nonce(address, prev));
    }

    /// Overwrite the code of `address`.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let account = self.accounts.entry(address).or_default();
        let prev = core::mem::replace(&mut account.code, Cell::Written(code));
        self.record(JournalEntry::Code(address, prev));
    }

    /// Overwrite a storage slot of `address`.
    pub fn set_storage(&mut self, address: Address, slot: U256, value: U256) {
        let cell = self.accounts.entry(address).or_default().storage.entry(slot).or_default();
        let prev = core::mem::replace(cell, Cell::Written(value));
        self.record(JournalEntry::Storage(address, slot, prev));
    }

    /// Add to the balance of `address`, saturating.
    pub async fn increase_balance(
        &mut self,
        address: Address,
        amount: U256,
    ) -> Result<(), AccessorError> {
        let balance = self.balance(address).await?;
        self.set_balance(address, balance.saturating_add(amount));
        Ok(())
    }

    /// Subtract from the balance of `address`, saturating at zero.
    pub async fn decrease_balance(
        &mut self,
        address: Address,
        amount: U256,
    ) -> Result<(), AccessorError> {
        let balance = self.balance(address).await?;
        self.set_balance(address, balance.saturating_sub(amount));
        Ok(())
    }

    /// Start journaling writes so they can be reverted.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint { journal_len: self.journal.len(), depth: self.depth }
    }

    /// Undo every write made since `checkpoint`. Values cached from the
    /// accessor are kept.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            let Some(entry) = self.journal.pop() else { break };
            match entry {
                JournalEntry::Balance(address, prev) => {
                    self.accounts.entry(address).or_default().balance = prev;
                }
                JournalEntry::Nonce(address, prev) => {
                    self.accounts.entry(address).or_default().nonce = prev;
                }
                JournalEntry::Code(address, prev) => {
                    self.accounts.entry(address).or_default().code = prev;
                }
                JournalEntry::Storage(address, slot, prev) => {
                    self.accounts.entry(address).or_default().storage.insert(slot, prev);
                }
            }
        }
        self.depth = checkpoint.depth.saturating_sub(1);
    }

    /// Keep every write made since `checkpoint`. An enclosing checkpoint can
    /// still revert them.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.depth = checkpoint.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }

    /// Every address this snapshot has read or written, sorted.
    pub fn touched_accounts(&self) -> Vec<Address> {
        self.accounts.keys().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// The writes held by this snapshot, by address.
    pub fn dirty_accounts(&self) -> BTreeMap<Address, AccountDiff> {
        self.accounts
            .iter()
            .filter(|(_, account)| account.is_dirty())
            .map(|(address, account)| {
                let diff = AccountDiff {
                    balance: account.balance.written().copied(),
                    nonce: account.nonce.written().copied(),
                    code: account.code.written().cloned(),
                    storage: account
                        .storage
                        .iter()
                        .filter_map(|(slot, cell)| cell.written().map(|value| (*slot, *value)))
                        .collect(),
                };
                (*address, diff)
            })
            .collect()
    }
}
