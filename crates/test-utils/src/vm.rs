use alloy::primitives::{Address, Bytes, Log, U256};
use bundlesim_evm::{ExecutorError, StateSnapshot, Vm, VmCall, VmOutcome};
use bundlesim_types::ChainStateAccessor;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// What a [`ScriptedVm`] does when a given address is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Write `writes` to the callee's storage, emit `logs`, and succeed.
    Succeed {
        /// Gas reported.
        gas_used: u64,
        /// Storage writes, applied in order.
        writes: Vec<(U256, U256)>,
        /// Logs emitted.
        logs: Vec<Log>,
        /// Return data.
        output: Bytes,
    },
    /// Read `slot` from the callee and write it back plus one.
    Increment {
        /// The counter slot.
        slot: U256,
        /// Gas reported.
        gas_used: u64,
    },
    /// Write `writes`, then revert with `output`.
    Revert {
        /// Gas reported.
        gas_used: u64,
        /// Storage writes made before reverting.
        writes: Vec<(U256, U256)>,
        /// Revert data.
        output: Bytes,
    },
    /// Halt exceptionally.
    Halt {
        /// Gas reported.
        gas_used: u64,
        /// Halt reason.
        reason: String,
    },
    /// Report one more unit of gas than was available.
    Overrun,
    /// Return an error.
    Fail(String),
}

impl Script {
    /// Succeed with no effects.
    pub const fn succeed(gas_used: u64) -> Self {
        Self::Succeed { gas_used, writes: Vec::new(), logs: Vec::new(), output: Bytes::new() }
    }

    /// Revert with no data and no writes.
    pub const fn revert(gas_used: u64) -> Self {
        Self::Revert { gas_used, writes: Vec::new(), output: Bytes::new() }
    }
}

/// A [`Vm`] whose behavior is scripted per callee address.
///
/// Calls to addresses without a script succeed using no gas. A creation
/// without a script deploys its initcode verbatim as runtime code. Every
/// call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedVm {
    scripts: HashMap<Address, Script>,
    calls: Mutex<Vec<VmCall>>,
}

impl ScriptedVm {
    /// Create a VM with no scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script calls to `address`.
    pub fn with_script(mut self, address: Address, script: Script) -> Self {
        self.scripts.insert(address, script);
        self
    }

    /// The calls made so far, in order.
    pub fn calls(&self) -> Vec<VmCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Vm for ScriptedVm {
    async fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> Result<VmOutcome, ExecutorError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call.clone());

        let Some(script) = self.scripts.get(&call.address).cloned() else {
            let output = if call.is_create { call.input.clone() } else { Bytes::new() };
            return Ok(VmOutcome::Success { gas_used: 0, logs: Vec::new(), output });
        };

        let outcome = match script {
            Script::Succeed { gas_used, writes, logs, output } => {
                for (slot, value) in writes {
                    state.set_storage(call.address, slot, value);
                }
                VmOutcome::Success { gas_used, logs, output }
            }
            Script::Increment { slot, gas_used } => {
                let current = state.storage(call.address, slot).await?;
                state.set_storage(call.address, slot, current + U256::from(1));
                VmOutcome::Success { gas_used, logs: Vec::new(), output: Bytes::new() }
            }
            Script::Revert { gas_used, writes, output } => {
                for (slot, value) in writes {
                    state.set_storage(call.address, slot, value);
                }
                VmOutcome::Revert { gas_used, output }
            }
            Script::Halt { gas_used, reason } => VmOutcome::Halt { gas_used, reason },
            Script::Overrun => VmOutcome::Success {
                gas_used: call.gas_limit + 1,
                logs: Vec::new(),
                output: Bytes::new(),
            },
            Script::Fail(message) => return Err(ExecutorError::vm(message)),
        };
        Ok(outcome)
    }
}
