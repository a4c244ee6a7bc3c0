mod transfer;
pub use transfer::TransferOnlyVm;

use crate::{BlockEnv, ExecutorError, StateSnapshot};
use alloy::primitives::{Address, Bytes, Log, TxHash, U256};
use bundlesim_types::ChainStateAccessor;
use core::future::Future;
use std::sync::Arc;

/// A contract call handed to a [`Vm`].
///
/// By the time the VM sees it, gas has been charged, the nonce bumped and
/// `value` already moved from `caller` to `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmCall {
    /// The transaction being executed.
    pub tx_hash: TxHash,
    /// Sender.
    pub caller: Address,
    /// The sender's nonce before this transaction. A creation deploys at
    /// `caller.create(nonce)`.
    pub nonce: u64,
    /// The callee, or the address being created.
    pub address: Address,
    /// True for contract creation. `input` is then initcode.
    pub is_create: bool,
    /// Value transferred.
    pub value: U256,
    /// Calldata or initcode.
    pub input: Bytes,
    /// Gas available to the VM, after intrinsic gas.
    pub gas_limit: u64,
    /// Intrinsic gas already charged for the transaction.
    pub intrinsic_gas: u64,
    /// Effective gas price.
    pub gas_price: u128,
    /// The block context.
    pub env: BlockEnv,
}

/// What the VM did with a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmOutcome {
    /// Execution succeeded. For a creation, `output` is the runtime code.
    Success {
        /// Gas consumed.
        gas_used: u64,
        /// Logs emitted.
        logs: Vec<Log>,
        /// Return data.
        output: Bytes,
    },
    /// Execution reverted.
    Revert {
        /// Gas consumed.
        gas_used: u64,
        /// Revert data.
        output: Bytes,
    },
    /// Execution halted exceptionally (out of gas, invalid opcode, ...).
    Halt {
        /// Gas consumed.
        gas_used: u64,
        /// Why execution halted.
        reason: String,
    },
}

impl VmOutcome {
    /// Gas consumed.
    pub const fn gas_used(&self) -> u64 {
        match self {
            Self::Success { gas_used, .. }
            | Self::Revert { gas_used, .. }
            | Self::Halt { gas_used, .. } => *gas_used,
        }
    }

    /// True if execution succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Executes contract code against a snapshot.
///
/// The executor opens a checkpoint before calling the VM and reverts it if
/// the outcome is not [`VmOutcome::Success`], so a VM only has to write its
/// effects through the snapshot setters. Returning an error aborts the
/// simulation.
pub trait Vm: Send + Sync {
    /// Run `call` against `state`.
    fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> impl Future<Output = Result<VmOutcome, ExecutorError>> + Send;
}

impl<T: Vm> Vm for Arc<T> {
    fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> impl Future<Output = Result<VmOutcome, ExecutorError>> + Send {
        (**self).execute(state, call)
    }
}

impl<T: Vm> Vm for &T {
    fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> impl Future<Output = Result<VmOutcome, ExecutorError>> + Send {
        (**self).execute(state, call)
    }
}
