use alloy::eips::eip2930::AccessList;

/// Base cost of a call transaction.
pub const CALL_BASE_GAS: u64 = 21_000;
/// Base cost of a contract creation transaction.
pub const CREATE_BASE_GAS: u64 = 53_000;
/// Cost per zero byte of calldata.
pub const ZERO_BYTE_GAS: u64 = 4;
/// Cost per non-zero byte of calldata (EIP-2028).
pub const NON_ZERO_BYTE_GAS: u64 = 16;
/// Cost per access list address (EIP-2930).
pub const ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
/// Cost per access list storage key (EIP-2930).
pub const ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;
/// Cost per 32-byte word of initcode (EIP-3860).
pub const INITCODE_WORD_GAS: u64 = 2;

/// Gas charged before any code runs.
pub fn intrinsic_gas(input: &[u8], is_create: bool, access_list: Option<&AccessList>) -> u64 {
    let base = if is_create { CREATE_BASE_GAS } else { CALL_BASE_GAS };

    let zeros = input.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = input.len() as u64 - zeros;
    let calldata = zeros * ZERO_BYTE_GAS + non_zeros * NON_ZERO_BYTE_GAS;

    let access = access_list.map_or(0, |list| {
        let keys: usize = list.iter().map(|item| item.storage_keys.len()).sum();
        list.len() as u64 * ACCESS_LIST_ADDRESS_GAS + keys as u64 * ACCESS_LIST_STORAGE_KEY_GAS
    });

    let initcode =
        if is_create { (input.len() as u64).div_ceil(32) * INITCODE_WORD_GAS } else { 0 };

    base + calldata + access + initcode
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy::{
        eips::eip2930::AccessListItem,
        primitives::{Address, B256},
    };

    #[test]
    fn plain_transfer() {
        assert_eq!(intrinsic_gas(&[], false, None), 21_000);
    }

    #[test]
    fn calldata() {
        assert_eq!(intrinsic_gas(&[0, 0, 1], false, None), 21_000 + 4 + 4 + 16);
    }

    #[test]
    fn create_charges_initcode_words() {
        let initcode = [1u8; 33];
        assert_eq!(intrinsic_gas(&initcode, true, None), 53_000 + 33 * 16 + 2 * 2);
    }

    #[test]
    fn access_list() {
        let list = AccessList(vec![
            AccessListItem { address: Address::ZERO, storage_keys: vec![B256::ZERO; 2] },
            AccessListItem { address: Address::repeat_byte(1), storage_keys: vec![] },
        ]);
        assert_eq!(intrinsic_gas(&[], false, Some(&list)), 21_000 + 2 * 2_400 + 2 * 1_900);
    }
}
