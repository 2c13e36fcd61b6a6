//! Bounds enforced on records and specifications.

use lazy_static::lazy_static;
use num_bigint::BigUint;

/// Smallest value an `int` entry may hold.
pub const POD_INT_MIN: i64 = i64::MIN;

/// Largest value an `int` entry may hold.
pub const POD_INT_MAX: i64 = i64::MAX;

/// Maximum length of an entry name or pod label, in bytes.
pub const MAX_ENTRY_NAME_LEN: usize = 128;

/// Maximum number of entries a single membership statement may range over.
pub const MAX_TUPLE_ARITY: usize = 4;

/// Length of a decoded EdDSA public key, in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// GPC protocol version stamped on proof requests by default.
pub const GPC_VERSION: u32 = 1;

/// Decimal form of the BN254 scalar field order.
const FIELD_ORDER: &[u8] =
    b"21888242871839275222246405745257275088548364400416034343698204186575808495617";

lazy_static! {
    /// Largest value a `cryptographic` entry may hold (field order minus one).
    pub static ref CRYPTOGRAPHIC_MAX: BigUint = BigUint::parse_bytes(FIELD_ORDER, 10)
        .map(|order| order - 1u32)
        .unwrap_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cryptographic_max_is_parsed() {
        assert!(*CRYPTOGRAPHIC_MAX > BigUint::from(u64::MAX));
        assert_eq!(
            CRYPTOGRAPHIC_MAX.to_string(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495616"
        );
    }
}
