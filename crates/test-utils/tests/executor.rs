//! Tests for single-transaction execution against a snapshot.
//!
//! - Preconditions fail without touching state.
//! - Gas and nonce are charged even when execution reverts.
//! - Everything else a reverted transaction did is rolled back.

use alloy::{
    consensus::{constants::GWEI_TO_WEI, TxEip1559},
    primitives::{bytes, Address, Bytes, Log, I256, U256},
    sol_types::{Revert, SolError},
};
use bundlesim_evm::{
    intrinsic_gas, BlockEnv, ExecutionStatus, Executor, ExecutorError, PreconditionFailure,
    StateSnapshot, TransferOnlyVm,
};
use bundlesim_test_utils::{
    chain::{
        target_header, test_accessor, COUNTER_ADDRESS, PARENT_BLOCK, REVERTER_ADDRESS,
        STARTING_BALANCE, TEST_BASE_FEE, TEST_BENEFICIARY,
    },
    init_tracing,
    txs::{
        decoded, legacy_send, make_wallet, sign_tx_with_key_pair, signed_send, simple_call,
        simple_create, simple_send, CALL_GAS_LIMIT, TEST_PRIORITY_FEE,
    },
    users::{TEST_SIGNERS, TEST_USERS},
    vm::{Script, ScriptedVm},
};

const RECIPIENT: Address = Address::repeat_byte(0x31);

/// `base fee + priority fee` for the default test transactions.
const GAS_PRICE: u128 = TEST_BASE_FEE as u128 + TEST_PRIORITY_FEE;

fn env() -> BlockEnv {
    BlockEnv::from(&target_header())
}

fn wei(gas: u64, price: u128) -> U256 {
    U256::from(gas) * U256::from(price)
}

#[tokio::test]
async fn plain_transfer() {
    init_tracing();
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let value = U256::from(GWEI_TO_WEI);
    let tx = decoded(&signed_send(&TEST_SIGNERS[0], RECIPIENT, value, 0));
    let outcome = executor.apply(&mut state, &tx).await.unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert_eq!(outcome.gas_used, 21_000);
    assert_eq!(outcome.gas_price, GAS_PRICE);
    assert_eq!(outcome.gas_fees(), wei(21_000, GAS_PRICE));
    assert!(outcome.revert_reason.is_none());

    let sender = TEST_USERS[0];
    assert_eq!(state.nonce(sender).await.unwrap(), 1);
    let spent = value + wei(21_000, GAS_PRICE);
    assert_eq!(state.balance(sender).await.unwrap(), STARTING_BALANCE - spent);
    assert_eq!(state.balance(RECIPIENT).await.unwrap(), value);

    let tip = wei(21_000, TEST_PRIORITY_FEE);
    assert_eq!(state.balance(TEST_BENEFICIARY).await.unwrap(), tip);
    assert_eq!(outcome.coinbase_diff, I256::from_raw(tip));
}

#[tokio::test]
async fn legacy_transfer_pays_full_price() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let price = GWEI_TO_WEI as u128 * 20;
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[0], legacy_send(RECIPIENT, U256::ZERO, 0, price));
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.gas_price, price);
    let tip = wei(21_000, price - TEST_BASE_FEE as u128);
    assert_eq!(outcome.coinbase_diff, I256::from_raw(tip));
}

#[tokio::test]
async fn nonce_mismatch_leaves_state_untouched() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let tx = decoded(&signed_send(&TEST_SIGNERS[0], RECIPIENT, U256::from(1), 1));
    let outcome = executor.apply(&mut state, &tx).await.unwrap();

    let mismatch = PreconditionFailure::NonceMismatch { expected: 0, got: 1 };
    assert_eq!(outcome.failure(), Some(&mismatch));
    assert_eq!(outcome.gas_used, 0);
    assert_eq!(outcome.coinbase_diff, I256::ZERO);
    assert!(state.dirty_accounts().is_empty());
}

#[tokio::test]
async fn successive_nonces() {
    let accessor = test_accessor();
    let executor = Executor::new(TransferOnlyVm, env());
    let first = decoded(&signed_send(&TEST_SIGNERS[0], RECIPIENT, U256::from(1), 0));
    let second = decoded(&signed_send(&TEST_SIGNERS[0], RECIPIENT, U256::from(1), 1));

    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    assert!(executor.apply(&mut state, &first).await.unwrap().is_success());
    assert!(executor.apply(&mut state, &second).await.unwrap().is_success());

    // Reversed, the nonce-1 transaction is attempted first and fails.
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let outcome = executor.apply(&mut state, &second).await.unwrap();
    assert!(matches!(outcome.failure(), Some(PreconditionFailure::NonceMismatch { .. })));
    assert!(executor.apply(&mut state, &first).await.unwrap().is_success());
}

#[tokio::test]
async fn insufficient_funds() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let broke = make_wallet(0x42);
    let tx = decoded(&signed_send(&broke, RECIPIENT, U256::from(1), 0));
    let outcome = executor.apply(&mut state, &tx).await.unwrap();

    assert!(matches!(
        outcome.failure(),
        Some(PreconditionFailure::InsufficientFunds { balance, .. }) if balance.is_zero()
    ));
    assert!(state.dirty_accounts().is_empty());
}

#[tokio::test]
async fn fee_cap_below_base_fee() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[0], legacy_send(RECIPIENT, U256::ZERO, 0, 1));
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert_eq!(
        outcome.failure(),
        Some(&PreconditionFailure::FeeCapTooLow { max_fee: 1, base_fee: TEST_BASE_FEE })
    );
}

#[tokio::test]
async fn tip_above_fee_cap() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let max_fee = GWEI_TO_WEI as u128 * 2;
    let tx = TxEip1559 {
        max_fee_per_gas: max_fee,
        max_priority_fee_per_gas: max_fee + 1,
        ..simple_send(RECIPIENT, U256::ZERO, 0)
    };
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[0], tx);
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert_eq!(
        outcome.failure(),
        Some(&PreconditionFailure::TipAboveFeeCap { max_priority_fee: max_fee + 1, max_fee })
    );
    assert_eq!(outcome.gas_used, 0);
    assert!(state.dirty_accounts().is_empty());
}

#[tokio::test]
async fn gas_limit_below_intrinsic() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let tx = TxEip1559 { gas_limit: 20_000, ..simple_send(RECIPIENT, U256::ZERO, 0) };
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[0], tx);
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert_eq!(
        outcome.failure(),
        Some(&PreconditionFailure::IntrinsicGasTooLow { intrinsic: 21_000, gas_limit: 20_000 })
    );
}

#[tokio::test]
async fn revert_keeps_fee_and_nonce() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let reason = Revert { reason: "nope".into() }.abi_encode();
    let vm = ScriptedVm::new().with_script(
        REVERTER_ADDRESS,
        Script::Revert {
            gas_used: 5_000,
            writes: vec![(U256::from(1), U256::from(7))],
            output: reason.into(),
        },
    );
    let executor = Executor::new(&vm, env());

    let input = bytes!("d09de08a");
    let value = U256::from(1_000);
    let call = simple_call(REVERTER_ADDRESS, input.clone(), value, 0);
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[1], call);
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    let gas_used = intrinsic_gas(&input, false, None) + 5_000;
    assert_eq!(gas_used, 26_064);
    assert_eq!(outcome.status, ExecutionStatus::Reverted);
    assert_eq!(outcome.gas_used, gas_used);
    assert!(outcome.revert_reason.as_deref().unwrap().contains("nope"));
    assert!(outcome.logs.is_empty());

    let sender = TEST_USERS[1];
    assert_eq!(state.nonce(sender).await.unwrap(), 1);
    let spent = wei(gas_used, GAS_PRICE);
    assert_eq!(state.balance(sender).await.unwrap(), STARTING_BALANCE - spent);
    assert_eq!(state.balance(REVERTER_ADDRESS).await.unwrap(), U256::ZERO);
    assert_eq!(state.storage(REVERTER_ADDRESS, U256::from(1)).await.unwrap(), U256::ZERO);
    assert_eq!(outcome.coinbase_diff, I256::from_raw(wei(gas_used, TEST_PRIORITY_FEE)));

    let calls = vm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].gas_limit, CALL_GAS_LIMIT - 21_064);
    assert_eq!(calls[0].value, value);
}

#[tokio::test]
async fn contract_writes_persist_across_transactions() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let log = Log::new_unchecked(COUNTER_ADDRESS, vec![], Bytes::from_static(b"hi"));
    let vm = ScriptedVm::new()
        .with_script(COUNTER_ADDRESS, Script::Increment { slot: U256::ZERO, gas_used: 20_000 })
        .with_script(
            REVERTER_ADDRESS,
            Script::Succeed {
                gas_used: 1_000,
                writes: vec![],
                logs: vec![log.clone()],
                output: Bytes::new(),
            },
        );
    let executor = Executor::new(&vm, env());

    for nonce in 0..2 {
        let call = simple_call(COUNTER_ADDRESS, Bytes::new(), U256::ZERO, nonce);
        let tx = sign_tx_with_key_pair(&TEST_SIGNERS[2], call);
        let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.gas_used, 41_000);
    }
    assert_eq!(state.storage(COUNTER_ADDRESS, U256::ZERO).await.unwrap(), U256::from(2));
    assert_eq!(accessor.storage_reads(), 1);

    let call = simple_call(REVERTER_ADDRESS, Bytes::new(), U256::ZERO, 2);
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[2], call);
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();
    assert_eq!(outcome.logs, vec![log]);
}

#[tokio::test]
async fn create_deploys_code() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let vm = ScriptedVm::new();
    let executor = Executor::new(&vm, env());

    let initcode = bytes!("6001");
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[3], simple_create(initcode.clone(), 0));
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.gas_used, intrinsic_gas(&initcode, true, None));

    let deployed = TEST_USERS[3].create(0);
    assert_eq!(state.code(deployed).await.unwrap(), initcode);
    assert!(vm.calls()[0].is_create);
}

#[tokio::test]
async fn transfer_only_vm_halts_on_code() {
    let accessor = test_accessor();
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let call = simple_call(COUNTER_ADDRESS, Bytes::new(), U256::from(5), 0);
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[4], call);
    let outcome = executor.apply(&mut state, &decoded(&tx)).await.unwrap();

    assert!(outcome.is_reverted());
    assert_eq!(outcome.gas_used, CALL_GAS_LIMIT);
    assert_eq!(outcome.revert_reason.as_deref(), Some("contract execution not supported"));
    assert_eq!(state.balance(COUNTER_ADDRESS).await.unwrap(), U256::ZERO);
}

#[tokio::test]
async fn vm_errors_abort() {
    let accessor = test_accessor();
    let vm = ScriptedVm::new()
        .with_script(COUNTER_ADDRESS, Script::Overrun)
        .with_script(REVERTER_ADDRESS, Script::Fail("boom".into()));
    let executor = Executor::new(&vm, env());

    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let call = simple_call(COUNTER_ADDRESS, Bytes::new(), U256::ZERO, 0);
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[5], call);
    let err = executor.apply(&mut state, &decoded(&tx)).await.unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::GasOverrun { consumed, available }
            if consumed == available + 1 && available == CALL_GAS_LIMIT - 21_000
    ));

    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let call = simple_call(REVERTER_ADDRESS, Bytes::new(), U256::ZERO, 0);
    let tx = sign_tx_with_key_pair(&TEST_SIGNERS[5], call);
    let err = executor.apply(&mut state, &decoded(&tx)).await.unwrap_err();
    assert!(matches!(err, ExecutorError::Vm(_)));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn accessor_failure_is_an_error() {
    let accessor = test_accessor().with_failing(RECIPIENT);
    let mut state = StateSnapshot::fork_from(&accessor, PARENT_BLOCK);
    let executor = Executor::new(TransferOnlyVm, env());

    let tx = decoded(&signed_send(&TEST_SIGNERS[0], RECIPIENT, U256::from(1), 0));
    let err = executor.apply(&mut state, &tx).await.unwrap_err();
    assert!(err.is_accessor());
}
