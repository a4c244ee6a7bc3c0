use alloy::{
    consensus::{constants::GWEI_TO_WEI, SignableTransaction, TxEip1559, TxEnvelope, TxLegacy},
    eips::Encodable2718,
    primitives::{Address, TxKind, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
};

pub(crate) const CHAIN_ID: u64 = 1;

pub(crate) fn make_wallet(i: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(i)).unwrap()
}

fn encode(tx: impl Into<TxEnvelope>) -> String {
    alloy::hex::encode_prefixed(tx.into().encoded_2718())
}

/// A signed EIP-1559 transfer, hex encoded.
pub(crate) fn simple_send(
    wallet: &PrivateKeySigner,
    to: Address,
    nonce: u64,
    value: U256,
) -> String {
    let tx = TxEip1559 {
        nonce,
        gas_limit: 21_000,
        to: TxKind::Call(to),
        value,
        chain_id: CHAIN_ID,
        max_fee_per_gas: GWEI_TO_WEI as u128 * 100,
        max_priority_fee_per_gas: GWEI_TO_WEI as u128,
        ..Default::default()
    };
    let sig = wallet.sign_hash_sync(&tx.signature_hash()).unwrap();
    encode(tx.into_signed(sig))
}

/// A signed legacy transfer, hex encoded.
pub(crate) fn legacy_tx(wallet: &PrivateKeySigner, to: Address, nonce: u64, value: U256) -> String {
    let tx = TxLegacy {
        chain_id: Some(CHAIN_ID),
        nonce,
        gas_price: GWEI_TO_WEI as u128 * 20,
        gas_limit: 21_000,
        to: TxKind::Call(to),
        value,
        ..Default::default()
    };
    let sig = wallet.sign_hash_sync(&tx.signature_hash()).unwrap();
    encode(tx.into_signed(sig))
}
