use crate::chain::TEST_CHAIN_ID;
use alloy::{
    consensus::{
        constants::GWEI_TO_WEI, SignableTransaction, Signed, TxEip1559, TxEnvelope, TxLegacy,
    },
    eips::Encodable2718,
    primitives::{Address, Bytes, TxHash, TxKind, B256, U256},
    signers::{local::PrivateKeySigner, Signature, SignerSync},
};
use bundlesim_bundle::{Bundle, BundleDocument, DecodedTransaction};

/// Default max fee per gas for test transactions.
pub const TEST_MAX_FEE: u128 = GWEI_TO_WEI as u128 * 100;

/// Default priority fee for test transactions.
pub const TEST_PRIORITY_FEE: u128 = GWEI_TO_WEI as u128;

/// Gas limit used by [`simple_call`].
pub const CALL_GAS_LIMIT: u64 = 100_000;

/// Make a wallet with a deterministic keypair.
pub fn make_wallet(i: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(i)).unwrap()
}

/// Sign a transaction with a wallet.
pub fn sign_tx_with_key_pair<T>(wallet: &PrivateKeySigner, tx: T) -> TxEnvelope
where
    T: SignableTransaction<Signature>,
    Signed<T>: Into<TxEnvelope>,
{
    let signature = wallet.sign_hash_sync(&tx.signature_hash()).unwrap();
    tx.into_signed(signature).into()
}

/// Make a simple send transaction.
pub fn simple_send(to: Address, amount: U256, nonce: u64) -> TxEip1559 {
    TxEip1559 {
        nonce,
        gas_limit: 21_000,
        to: TxKind::Call(to),
        value: amount,
        chain_id: TEST_CHAIN_ID,
        max_fee_per_gas: TEST_MAX_FEE,
        max_priority_fee_per_gas: TEST_PRIORITY_FEE,
        ..Default::default()
    }
}

/// Make a contract call with [`CALL_GAS_LIMIT`] gas.
pub fn simple_call(to: Address, input: impl Into<Bytes>, amount: U256, nonce: u64) -> TxEip1559 {
    TxEip1559 {
        gas_limit: CALL_GAS_LIMIT,
        input: input.into(),
        ..simple_send(to, amount, nonce)
    }
}

/// Make a contract creation.
pub fn simple_create(initcode: impl Into<Bytes>, nonce: u64) -> TxEip1559 {
    TxEip1559 {
        nonce,
        gas_limit: 200_000,
        to: TxKind::Create,
        input: initcode.into(),
        chain_id: TEST_CHAIN_ID,
        max_fee_per_gas: TEST_MAX_FEE,
        max_priority_fee_per_gas: TEST_PRIORITY_FEE,
        ..Default::default()
    }
}

/// Make a legacy send transaction paying `gas_price`.
pub fn legacy_send(to: Address, amount: U256, nonce: u64, gas_price: u128) -> TxLegacy {
    TxLegacy {
        chain_id: Some(TEST_CHAIN_ID),
        nonce,
        gas_price,
        gas_limit: 21_000,
        to: TxKind::Call(to),
        value: amount,
        ..Default::default()
    }
}

/// Sign a send.
pub fn signed_send(wallet: &PrivateKeySigner, to: Address, amount: U256, nonce: u64) -> TxEnvelope {
    sign_tx_with_key_pair(wallet, simple_send(to, amount, nonce))
}

/// Hex encode a signed transaction.
pub fn encode_hex(tx: &TxEnvelope) -> String {
    alloy::hex::encode_prefixed(tx.encoded_2718())
}

/// The hash of a signed transaction.
pub fn tx_hash(tx: &TxEnvelope) -> TxHash {
    *tx.tx_hash()
}

/// Decode a signed transaction the way the validator does.
pub fn decoded(tx: &TxEnvelope) -> DecodedTransaction {
    DecodedTransaction::decode_2718(&tx.encoded_2718()).unwrap()
}

/// A bundle document targeting `block_number` with `txs` in order.
pub fn bundle_document(block_number: u64, txs: &[TxEnvelope]) -> BundleDocument {
    txs.iter().fold(BundleDocument::new(block_number), |doc, tx| doc.append_raw_tx(encode_hex(tx)))
}

/// Serialize a bundle document as it would arrive on the wire.
pub fn bundle_json(document: &BundleDocument) -> Vec<u8> {
    serde_json::to_vec(document).unwrap()
}

/// A validated bundle targeting `block_number` with `txs` in order.
pub fn simple_bundle(block_number: u64, txs: &[TxEnvelope]) -> Bundle {
    bundle_document(block_number, txs).validate().unwrap()
}
