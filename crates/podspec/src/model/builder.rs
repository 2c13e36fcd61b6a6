//! Builder API for ergonomic Pod construction.
//!
//! # Example
//!
//! ```rust
//! use podspec::model::builder::PodBuilder;
//!
//! let pod = PodBuilder::new()
//!     .string("event", "devcon")
//!     .int("ticket_number", 42)
//!     .build("signature", "ab".repeat(32))
//!     .unwrap();
//!
//! assert_eq!(pod.entries().len(), 2);
//! ```

use num_bigint::BigUint;

use crate::error::PodError;
use crate::model::{Pod, PodValue};

/// Builder for the entries of a [`Pod`].
///
/// Checks are deferred to [`PodBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct PodBuilder {
    entries: Vec<(String, PodValue)>,
}

impl PodBuilder {
    /// Creates a new empty PodBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry value.
    pub fn value(mut self, name: impl Into<String>, value: PodValue) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    /// Adds a string entry.
    pub fn string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.value(name, PodValue::String(value.into()))
    }

    /// Adds an int entry.
    pub fn int(self, name: impl Into<String>, value: i64) -> Self {
        self.value(name, PodValue::Int(value))
    }

    /// Adds a cryptographic entry.
    pub fn cryptographic(self, name: impl Into<String>, value: impl Into<BigUint>) -> Self {
        self.value(name, PodValue::Cryptographic(value.into()))
    }

    /// Adds a public key entry.
    pub fn eddsa_pubkey(self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.value(name, PodValue::EdDsaPublicKey(key.into()))
    }

    /// Returns the number of entries added so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Builds the record with the given signature and signer key.
    pub fn build(
        self,
        signature: impl Into<String>,
        signer_public_key: impl Into<String>,
    ) -> Result<Pod, PodError> {
        Pod::new(self.entries, signature, signer_public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_builder_basic() {
        let key = "cd".repeat(32);
        let pod = PodBuilder::new()
            .string("name", "Alice")
            .int("age", 30)
            .cryptographic("commitment", 99u32)
            .eddsa_pubkey("owner", key.clone())
            .build("sig", key.clone())
            .unwrap();

        assert_eq!(pod.entries().len(), 4);
        assert_eq!(pod.entries()["age"], PodValue::int(30));
        assert_eq!(pod.entries()["owner"], PodValue::eddsa_pubkey(key));
    }

    #[test]
    fn test_pod_builder_duplicate_fails_at_build() {
        let builder = PodBuilder::new().int("a", 1).int("a", 2);
        assert_eq!(builder.entry_count(), 2);
        assert!(matches!(
            builder.build("sig", "ab".repeat(32)),
            Err(PodError::DuplicateEntry { .. })
        ));
    }
}
