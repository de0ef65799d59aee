//! Starknet entry-point and event selectors.

use num_bigint::BigUint;
use sha3::{Digest, Keccak256};

/// Selectors are Keccak-256 truncated to the low 250 bits.
const SELECTOR_MASK_BITS: u64 = 250;

/// Compute `starknet_keccak(name)`.
pub fn selector(name: &str) -> BigUint {
    let mut hasher = Keccak256::new();
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mask = (BigUint::from(1u8) << SELECTOR_MASK_BITS) - 1u8;
    BigUint::from_bytes_be(&hash) & mask
}

/// Selector as `0x`-prefixed lowercase hex, the form the node expects.
pub fn selector_hex(name: &str) -> String {
    format!("{:#x}", selector(name))
}
