use crate::{ExecutorError, StateSnapshot, Vm, VmCall, VmOutcome};
use alloy::primitives::Bytes;
use bundlesim_types::ChainStateAccessor;
use tracing::debug;

/// A [`Vm`] that cannot run code.
///
/// Any call into contract code halts and consumes all remaining gas. A
/// creation with empty initcode succeeds and deploys nothing. Useful for
/// offline simulation of plain transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOnlyVm;

impl Vm for TransferOnlyVm {
    async fn execute<A: ChainStateAccessor>(
        &self,
        _state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> Result<VmOutcome, ExecutorError> {
        if call.is_create && call.input.is_empty() {
            return Ok(VmOutcome::Success { gas_used: 0, logs: Vec::new(), output: Bytes::new() });
        }
        debug!(address = %call.address, "contract execution unsupported, halting");
        Ok(VmOutcome::Halt {
            gas_used: call.gas_limit,
            reason: "contract execution not supported".to_string(),
        })
    }
}
