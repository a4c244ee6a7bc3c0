use crate::{
    intrinsic_gas, BlockEnv, ExecutionOutcome, ExecutionStatus, ExecutorError,
    PreconditionFailure, StateSnapshot, Vm, VmCall, VmOutcome,
};
use alloy::{
    primitives::{Bytes, Log, I256, U256},
    sol_types::decode_revert_reason,
};
use bundlesim_bundle::DecodedTransaction;
use bundlesim_types::ChainStateAccessor;
use tracing::{debug, instrument, trace};

/// Applies transactions to a [`StateSnapshot`] within one block context.
#[derive(Debug, Clone)]
pub struct Executor<V> {
    vm: V,
    env: BlockEnv,
}

/// What the VM stage produced, before fees are settled.
struct Executed {
    status: ExecutionStatus,
    vm_gas: u64,
    logs: Vec<Log>,
    output: Bytes,
    revert_reason: Option<String>,
}

impl Executed {
    const fn plain_transfer() -> Self {
        Self {
            status: ExecutionStatus::Success,
            vm_gas: 0,
            logs: Vec::new(),
            output: Bytes::new(),
            revert_reason: None,
        }
    }
}

/// Decode revert data as `Error(string)` or `Panic(uint256)`, falling back
/// to hex.
fn revert_reason(output: &Bytes) -> String {
    if output.is_empty() {
        return "execution reverted".to_string();
    }
    decode_revert_reason(output).unwrap_or_else(|| alloy::hex::encode_prefixed(output))
}

impl<V: Vm> Executor<V> {
    /// Create an executor for the given block.
    pub const fn new(vm: V, env: BlockEnv) -> Self {
        Self { vm, env }
    }

    /// The block context.
    pub const fn env(&self) -> &BlockEnv {
        &self.env
    }

    /// The VM.
    pub const fn vm(&self) -> &V {
        &self.vm
    }

    async fn check_preconditions<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        tx: &DecodedTransaction,
    ) -> Result<Option<PreconditionFailure>, ExecutorError> {
        let sender = tx.sender();

        let expected = state.nonce(sender).await?;
        if expected != tx.nonce() {
            return Ok(Some(PreconditionFailure::NonceMismatch { expected, got: tx.nonce() }));
        }

        if let Some(max_priority_fee) = tx.max_priority_fee_per_gas() {
            if max_priority_fee > tx.max_fee_per_gas() {
                return Ok(Some(PreconditionFailure::TipAboveFeeCap {
                    max_priority_fee,
                    max_fee: tx.max_fee_per_gas(),
                }));
            }
        }

        if let Some(base_fee) = self.env.base_fee {
            if tx.max_fee_per_gas() < base_fee as u128 {
                return Ok(Some(PreconditionFailure::FeeCapTooLow {
                    max_fee: tx.max_fee_per_gas(),
                    base_fee,
                }));
            }
        }

        let intrinsic = intrinsic_gas(tx.input(), tx.is_create(), tx.access_list());
        if intrinsic > tx.gas_limit() {
            return Ok(Some(PreconditionFailure::IntrinsicGasTooLow {
                intrinsic,
                gas_limit: tx.gas_limit(),
            }));
        }

        let balance = state.balance(sender).await?;
        let required = tx.max_cost();
        if balance < required {
            return Ok(Some(PreconditionFailure::InsufficientFunds { balance, required }));
        }

        Ok(None)
    }

    async fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        tx: &DecodedTransaction,
        sender_nonce: u64,
        gas_price: u128,
        intrinsic: u64,
    ) -> Result<Executed, ExecutorError> {
        let available = tx.gas_limit() - intrinsic;
        let sender = tx.sender();
        let address = tx.to().unwrap_or_else(|| sender.create(sender_nonce));

        let checkpoint = state.checkpoint();

        state.decrease_balance(sender, tx.value()).await?;
        state.increase_balance(address, tx.value()).await?;

        if !tx.is_create() && state.code(address).await?.is_empty() {
            state.commit(checkpoint);
            return Ok(Executed::plain_transfer());
        }

        let call = VmCall {
            tx_hash: tx.hash(),
            caller: sender,
            nonce: sender_nonce,
            address,
            is_create: tx.is_create(),
            value: tx.value(),
            input: tx.input().clone(),
            gas_limit: available,
            intrinsic_gas: intrinsic,
            gas_price,
            env: self.env,
        };
        trace!(%address, gas = available, "invoking vm");

        let outcome = match self.vm.execute(state, &call).await {
            Ok(outcome) => outcome,
            Err(err) => {
                state.revert_to(checkpoint);
                return Err(err);
            }
        };

        let vm_gas = outcome.gas_used();
        if vm_gas > available {
            state.revert_to(checkpoint);
            return Err(ExecutorError::GasOverrun { consumed: vm_gas, available });
        }

        let executed = match outcome {
            VmOutcome::Success { logs, output, .. } => {
                if call.is_create && !output.is_empty() {
                    state.set_code(address, output.clone());
                }
                state.commit(checkpoint);
                Executed {
                    status: ExecutionStatus::Success,
                    vm_gas,
                    logs,
                    output,
                    revert_reason: None,
                }
            }
            VmOutcome::Revert { output, .. } => {
                state.revert_to(checkpoint);
                Executed {
                    status: ExecutionStatus::Reverted,
                    vm_gas,
                    logs: Vec::new(),
                    revert_reason: Some(revert_reason(&output)),
                    output,
                }
            }
            VmOutcome::Halt { reason, .. } => {
                state.revert_to(checkpoint);
                Executed {
                    status: ExecutionStatus::Reverted,
                    vm_gas,
                    logs: Vec::new(),
                    output: Bytes::new(),
                    revert_reason: Some(reason),
                }
            }
        };
        Ok(executed)
    }

    /// Apply one transaction to `state`.
    ///
    /// Preconditions (nonce, fee caps, intrinsic gas, balance) are checked
    /// first. A failure there is reported as
    /// [`ExecutionStatus::FailedPrecondition`] and leaves the snapshot
    /// untouched. Otherwise the sender pays `gas_limit * gas_price` up front
    /// and its nonce is bumped, value moves, contract code runs in the VM,
    /// and unused gas is refunded. A revert discards everything except the
    /// fee and nonce. The beneficiary is credited the priority fee on gas
    /// used.
    #[instrument(skip_all, fields(tx_hash = %tx.hash(), from = %tx.sender()))]
    pub async fn apply<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        tx: &DecodedTransaction,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let sender = tx.sender();
        let gas_price = tx.effective_gas_price(self.env.base_fee);

        if let Some(failure) = self.check_preconditions(state, tx).await? {
            debug!(%failure, "precondition failed");
            return Ok(ExecutionOutcome::precondition_failed(
                tx.hash(),
                sender,
                gas_price,
                failure,
            ));
        }

        let beneficiary = self.env.beneficiary;
        let coinbase_before = state.balance(beneficiary).await?;

        let price = U256::from(gas_price);
        let gas_limit = tx.gas_limit();
        let nonce = state.nonce(sender).await?;
        state.decrease_balance(sender, price * U256::from(gas_limit)).await?;
        state.set_nonce(sender, nonce.saturating_add(1));

        let intrinsic = intrinsic_gas(tx.input(), tx.is_create(), tx.access_list());
        let executed = self.execute(state, tx, nonce, gas_price, intrinsic).await?;

        let gas_used = intrinsic + executed.vm_gas;
        state.increase_balance(sender, price * U256::from(gas_limit - gas_used)).await?;

        let priority_fee = gas_price.saturating_sub(self.env.base_fee() as u128);
        let tip = U256::from(priority_fee) * U256::from(gas_used);
        state.increase_balance(beneficiary, tip).await?;

        let coinbase_after = state.balance(beneficiary).await?;
        let coinbase_diff =
            I256::from_raw(coinbase_after).wrapping_sub(I256::from_raw(coinbase_before));

        debug!(status = %executed.status, gas_used, "applied transaction");

        Ok(ExecutionOutcome {
            tx_hash: tx.hash(),
            from: sender,
            status: executed.status,
            gas_used,
            gas_price,
            logs: executed.logs,
            output: executed.output,
            revert_reason: executed.revert_reason,
            coinbase_diff,
        })
    }
}
