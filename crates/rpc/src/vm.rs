use alloy::{
    eips::BlockId,
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::eth::{
        simulate::{SimBlock, SimCallResult, SimulatePayload},
        state::{AccountOverride, StateOverride, StateOverridesBuilder},
        BlockOverrides, TransactionRequest,
    },
};
use bundlesim_evm::{AccountDiff, ExecutorError, StateSnapshot, Vm, VmCall, VmOutcome};
use bundlesim_types::{AccessorError, ChainStateAccessor};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A [`Vm`] that runs contract code on a node via `eth_simulateV1`.
///
/// The call runs against the snapshot's fork height with the snapshot's
/// pending writes as state overrides, so earlier transactions in the bundle
/// are visible to it. Storage written by the remote call is not reported
/// back by the node and is therefore not applied to the snapshot.
#[derive(Debug, Clone)]
pub struct RpcCallVm<P> {
    provider: P,
}

impl<P> RpcCallVm<P> {
    /// Create a VM calling through `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Translate snapshot writes into state overrides.
///
/// The snapshot already holds the transaction's own effects: value moved
/// and the caller's nonce bumped. The node applies both again when it runs
/// the call, so they are undone here first. The caller's nonce goes back
/// to the transaction nonce, which also makes a creation land at the
/// address the executor recorded.
fn overrides(mut dirty: BTreeMap<Address, AccountDiff>, call: &VmCall) -> StateOverride {
    if !call.value.is_zero() {
        let caller = dirty.entry(call.caller).or_default();
        caller.balance = caller.balance.map(|balance| balance.saturating_add(call.value));
        let callee = dirty.entry(call.address).or_default();
        callee.balance = callee.balance.map(|balance| balance.saturating_sub(call.value));
    }
    dirty.entry(call.caller).or_default().nonce = Some(call.nonce);

    dirty
        .into_iter()
        .fold(StateOverridesBuilder::with_capacity(0), |builder, (address, diff)| {
            let mut account = AccountOverride::default();
            if let Some(balance) = diff.balance {
                account = account.with_balance(balance);
            }
            if let Some(nonce) = diff.nonce {
                account = account.with_nonce(nonce);
            }
            if let Some(code) = diff.code {
                account = account.with_code(code);
            }
            if !diff.storage.is_empty() {
                account = account.with_state_diff(diff.storage.into_iter().map(|(slot, value)| {
                    (B256::from(slot.to_be_bytes::<32>()), B256::from(value.to_be_bytes::<32>()))
                }));
            }
            builder.append(address, account)
        })
        .build()
}

/// The call as the node should run it. Gas has already been bought in the
/// snapshot, so the node runs it at zero fees and charges nothing.
fn request(call: &VmCall) -> TransactionRequest {
    let request = TransactionRequest::default()
        .from(call.caller)
        .nonce(call.nonce)
        .value(call.value)
        .input(call.input.clone().into())
        .gas_limit(call.gas_limit + call.intrinsic_gas)
        .max_fee_per_gas(0)
        .max_priority_fee_per_gas(0);
    if call.is_create {
        request.create()
    } else {
        request.to(call.address)
    }
}

fn block_overrides(call: &VmCall) -> BlockOverrides {
    let mut overrides = BlockOverrides::default();
    overrides.number = Some(U256::from(call.env.number));
    overrides.time = Some(call.env.timestamp);
    overrides.coinbase = Some(call.env.beneficiary);
    overrides.base_fee = call.env.base_fee.map(U256::from);
    overrides
}

/// Map the node's result to a [`VmOutcome`]. The node reports total gas, so
/// intrinsic gas is taken back out.
fn outcome(result: SimCallResult, intrinsic_gas: u64) -> VmOutcome {
    let gas_used = result.gas_used.saturating_sub(intrinsic_gas);
    match (result.status, result.error) {
        (true, _) => VmOutcome::Success {
            gas_used,
            logs: result.logs.into_iter().map(|log| log.inner).collect(),
            output: result.return_data,
        },
        (false, Some(err)) if result.return_data.is_empty() => {
            VmOutcome::Halt { gas_used, reason: err.message }
        }
        (false, _) => VmOutcome::Revert { gas_used, output: result.return_data },
    }
}

impl<P: Provider> Vm for RpcCallVm<P> {
    #[instrument(skip_all, fields(tx_hash = %call.tx_hash, address = %call.address))]
    async fn execute<A: ChainStateAccessor>(
        &self,
        state: &mut StateSnapshot<A>,
        call: &VmCall,
    ) -> Result<VmOutcome, ExecutorError> {
        let block = SimBlock {
            block_overrides: Some(block_overrides(call)),
            state_overrides: Some(overrides(state.dirty_accounts(), call)),
            calls: vec![request(call)],
        };
        let payload = SimulatePayload {
            block_state_calls: vec![block],
            trace_transfers: false,
            validation: false,
            return_full_transactions: false,
        };

        let simulated = self
            .provider
            .simulate(&payload)
            .block_id(BlockId::number(state.block()))
            .await
            .map_err(AccessorError::transport)?;

        let result = simulated
            .into_iter()
            .next()
            .and_then(|block| block.calls.into_iter().next())
            .ok_or_else(|| ExecutorError::vm("eth_simulateV1 returned no call result"))?;

        debug!(status = result.status, gas_used = result.gas_used, "remote call finished");
        Ok(outcome(result, call.intrinsic_gas))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy::{
        consensus::Header,
        primitives::{Bytes, TxHash, TxKind},
        providers::ProviderBuilder,
        rpc::types::{simulate::SimulatedBlock, Block},
        transports::mock::Asserter,
    };
    use bundlesim_evm::BlockEnv;
    use bundlesim_types::InMemoryAccessor;

    fn call(value: u64) -> VmCall {
        VmCall {
            tx_hash: TxHash::ZERO,
            caller: Address::repeat_byte(1),
            nonce: 0,
            address: Address::repeat_byte(2),
            is_create: false,
            value: U256::from(value),
            input: Bytes::new(),
            gas_limit: 79_000,
            intrinsic_gas: 21_000,
            gas_price: 10,
            env: BlockEnv { number: 5, timestamp: 50, base_fee: Some(7), ..Default::default() },
        }
    }

    fn create(nonce: u64) -> VmCall {
        let caller = Address::repeat_byte(1);
        VmCall {
            nonce,
            address: caller.create(nonce),
            is_create: true,
            input: Bytes::from_static(&[0x60, 0x00]),
            ..call(0)
        }
    }

    fn simulated(result: serde_json::Value) -> Vec<SimulatedBlock> {
        let block = Block::empty(alloy::rpc::types::Header::new(Header::default()));
        let calls = vec![serde_json::from_value(result).unwrap()];
        vec![SimulatedBlock { inner: block, calls }]
    }

    /// A snapshot holding what the executor writes before calling the VM:
    /// gas bought and the nonce bumped.
    fn bought_gas(call: &VmCall) -> StateSnapshot<InMemoryAccessor> {
        let mut state = StateSnapshot::fork_from(InMemoryAccessor::new(), 4);
        state.set_balance(call.caller, U256::from(90));
        state.set_nonce(call.caller, call.nonce + 1);
        state
    }

    fn mocked(asserter: &Asserter) -> RpcCallVm<impl Provider> {
        RpcCallVm::new(ProviderBuilder::new().connect_mocked_client(asserter.clone()))
    }

    #[test]
    fn overrides_undo_value_transfer() {
        let mut dirty = BTreeMap::new();
        dirty.insert(
            Address::repeat_byte(1),
            AccountDiff { balance: Some(U256::from(90)), nonce: Some(1), ..Default::default() },
        );
        dirty.insert(
            Address::repeat_byte(2),
            AccountDiff {
                balance: Some(U256::from(10)),
                storage: [(U256::from(1), U256::from(2))].into_iter().collect(),
                ..Default::default()
            },
        );

        let state = overrides(dirty, &call(10));
        let caller = &state[&Address::repeat_byte(1)];
        assert_eq!(caller.balance, Some(U256::from(100)));
        assert_eq!(caller.nonce, Some(0));

        let callee = &state[&Address::repeat_byte(2)];
        assert_eq!(callee.balance, Some(U256::ZERO));
        let diff = callee.state_diff.as_ref().unwrap();
        assert_eq!(diff.get(&B256::with_last_byte(1)), Some(&B256::with_last_byte(2)));
    }

    #[test]
    fn create_runs_at_the_recorded_address() {
        let call = create(3);
        let state = bought_gas(&call);

        let overrides = overrides(state.dirty_accounts(), &call);
        let nonce = overrides[&call.caller].nonce.unwrap();
        assert_eq!(nonce, 3);
        assert_eq!(call.caller.create(nonce), call.address);

        let request = request(&call);
        assert_eq!(request.to, Some(TxKind::Create));
        assert_eq!(request.nonce, Some(3));
    }

    #[test]
    fn request_runs_without_fees() {
        let request = request(&call(0));
        assert_eq!(request.gas, Some(100_000));
        assert_eq!(request.from, Some(Address::repeat_byte(1)));
        assert_eq!(request.to, Some(TxKind::Call(Address::repeat_byte(2))));
        assert_eq!(request.max_fee_per_gas, Some(0));
        assert_eq!(request.max_priority_fee_per_gas, Some(0));

        let block = block_overrides(&call(0));
        assert_eq!(block.base_fee, Some(U256::from(7)));
    }

    #[test]
    fn maps_results() {
        let success: SimCallResult = serde_json::from_value(serde_json::json!({
            "returnData": "0x01",
            "logs": [],
            "gasUsed": "0x7530",
            "status": "0x1"
        }))
        .unwrap();
        assert_eq!(
            outcome(success, 21_000),
            VmOutcome::Success {
                gas_used: 9_000,
                logs: vec![],
                output: Bytes::from_static(&[1])
            }
        );

        let reverted: SimCallResult = serde_json::from_value(serde_json::json!({
            "returnData": "0xdead",
            "logs": [],
            "gasUsed": "0x5dc0",
            "status": "0x0",
            "error": { "code": 3, "message": "execution reverted" }
        }))
        .unwrap();
        assert!(matches!(outcome(reverted, 21_000), VmOutcome::Revert { gas_used: 3_000, .. }));
    }

    #[tokio::test]
    async fn executes_create_remotely() {
        let asserter = Asserter::new();
        asserter.push_success(&simulated(serde_json::json!({
            "returnData": "0x6000",
            "logs": [],
            "gasUsed": "0xd6d8",
            "status": "0x1"
        })));

        let call = create(0);
        let mut state = bought_gas(&call);
        let outcome = mocked(&asserter).execute(&mut state, &call).await.unwrap();

        assert_eq!(
            outcome,
            VmOutcome::Success {
                gas_used: 55_000 - 21_000,
                logs: vec![],
                output: Bytes::from_static(&[0x60, 0x00])
            }
        );
        assert_eq!(state.dirty_accounts()[&call.caller].nonce, Some(1));
    }

    #[tokio::test]
    async fn executes_reverting_call_remotely() {
        let asserter = Asserter::new();
        asserter.push_success(&simulated(serde_json::json!({
            "returnData": "0x",
            "logs": [],
            "gasUsed": "0x5208",
            "status": "0x0",
            "error": { "code": -32015, "message": "invalid opcode" }
        })));

        let call = call(0);
        let mut state = bought_gas(&call);
        let outcome = mocked(&asserter).execute(&mut state, &call).await.unwrap();
        assert_eq!(outcome, VmOutcome::Halt { gas_used: 0, reason: "invalid opcode".to_string() });
    }

    #[tokio::test]
    async fn node_errors_are_accessor_errors() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("node is down");

        let call = call(0);
        let mut state = bought_gas(&call);
        let err = mocked(&asserter).execute(&mut state, &call).await.unwrap_err();
        assert!(err.is_accessor());
    }

    #[tokio::test]
    async fn empty_response_is_a_vm_error() {
        let asserter = Asserter::new();
        asserter.push_success(&Vec::<SimulatedBlock>::new());

        let call = call(0);
        let mut state = bought_gas(&call);
        let err = mocked(&asserter).execute(&mut state, &call).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Vm(_)));
    }
}
