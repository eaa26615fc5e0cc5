//! Common utility and helper functions that are used across the project

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use candid::Nat;
use num_bigint::BigUint;

use super::error::*;
use crate::constants::{ray, PERCENT_DISPLAY_DECIMALS};

/// Converts String to Address and returns VaultError on failure
pub fn string_to_address(input: String) -> VaultResult<Address> {
    Address::from_str(&input).map_err(|err| VaultError::DecodingError(format!("{:#?}", err)))
}

/// Converts values of type `Nat` to `U256`
pub fn nat_to_u256(n: &Nat) -> VaultResult<U256> {
    let be_bytes = n.0.to_bytes_be();
    if be_bytes.len() > 32 {
        return Err(decoding_err("The `Nat` input length exceedes 32 bytes when converted to big-endian bytes representation."));
    }
    // Ensure the byte array is exactly 32 bytes long
    let mut padded_bytes = [0u8; 32];
    let start_pos = 32 - be_bytes.len();
    padded_bytes[start_pos..].copy_from_slice(&be_bytes);

    Ok(U256::from_be_bytes(padded_bytes))
}

/// Converts values of type `U256` to `Nat`
pub fn u256_to_nat(value: &U256) -> Nat {
    Nat::from(BigUint::from_bytes_be(&value.to_be_bytes::<32>()))
}

/// Returns `T` from the ABI-encoded return data of `F`.
pub fn decode_abi_response<T, F: SolCall<Return = T>>(data: &[u8]) -> VaultResult<T> {
    F::abi_decode_returns(data, true).map_err(|err| VaultError::DecodingError(err.to_string()))
}

/// Renders a call's selector for journal notes, e.g. `0x617ba037`
pub fn selector_hex(data: &[u8]) -> String {
    let end = data.len().min(4);
    format!("0x{}", hex::encode(&data[..end]))
}

/// Renders a ray-scaled annual rate as a percentage string.
///
/// The value is truncated (never rounded up) to `PERCENT_DISPLAY_DECIMALS` decimals.
/// Display only: yields are always compared on the ray value.
pub fn ray_to_percent(rate: U256) -> VaultResult<String> {
    // percent with PERCENT_DISPLAY_DECIMALS fractional digits, as an integer
    let unit = U256::from(10u64).pow(U256::from(PERCENT_DISPLAY_DECIMALS));
    let scaled = rate
        .checked_mul(U256::from(100u64))
        .and_then(|percent| percent.checked_mul(unit))
        .ok_or_else(|| arithmetic_err("Rate is too large to render as a percentage."))?
        / ray();
    let whole = scaled / unit;
    let fraction = scaled % unit;
    Ok(format!(
        "{}.{:0>width$}",
        whole,
        fraction.to_string(),
        width = PERCENT_DISPLAY_DECIMALS as usize
    ))
}
