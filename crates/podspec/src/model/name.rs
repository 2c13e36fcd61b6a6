//! Entry names and virtual entries.
//!
//! Stored entry names match `[A-Za-z_][A-Za-z0-9_]*`. Names starting with `$`
//! are reserved for virtual entries, which are derived from a record rather
//! than stored in it.

use crate::limits::MAX_ENTRY_NAME_LEN;
use crate::model::PodValueType;

/// Name of the content identifier virtual entry.
pub const CONTENT_ID: &str = "$contentID";
/// Name of the signature virtual entry.
pub const SIGNATURE: &str = "$signature";
/// Name of the signer public key virtual entry.
pub const SIGNER_PUBLIC_KEY: &str = "$signerPublicKey";

/// A computed pseudo-entry available on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualEntry {
    ContentId,
    Signature,
    SignerPublicKey,
}

impl VirtualEntry {
    pub const ALL: [VirtualEntry; 3] = [
        VirtualEntry::ContentId,
        VirtualEntry::Signature,
        VirtualEntry::SignerPublicKey,
    ];

    /// Looks up a virtual entry by its `$`-prefixed name.
    pub fn from_name(name: &str) -> Option<VirtualEntry> {
        match name {
            CONTENT_ID => Some(VirtualEntry::ContentId),
            SIGNATURE => Some(VirtualEntry::Signature),
            SIGNER_PUBLIC_KEY => Some(VirtualEntry::SignerPublicKey),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VirtualEntry::ContentId => CONTENT_ID,
            VirtualEntry::Signature => SIGNATURE,
            VirtualEntry::SignerPublicKey => SIGNER_PUBLIC_KEY,
        }
    }

    /// The kind every value of this entry has.
    pub fn value_type(self) -> PodValueType {
        match self {
            VirtualEntry::ContentId | VirtualEntry::Signature => PodValueType::String,
            VirtualEntry::SignerPublicKey => PodValueType::EdDsaPublicKey,
        }
    }
}

/// Validates a stored entry name (or pod label).
///
/// Names must:
/// - Be non-empty and at most [`MAX_ENTRY_NAME_LEN`] bytes
/// - Start with an ASCII letter or underscore
/// - Contain only ASCII letters, digits and underscores
pub fn validate_entry_name(name: &str) -> Result<(), &'static str> {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return Err("name is empty");
    };
    if name.len() > MAX_ENTRY_NAME_LEN {
        return Err("name exceeds maximum length");
    }
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return Err("name must start with a letter or underscore");
    }
    if !bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err("name may only contain letters, digits and underscores");
    }
    Ok(())
}

/// Returns true if `name` is a valid stored name or a known virtual entry.
pub fn is_declarable(name: &str) -> bool {
    VirtualEntry::from_name(name).is_some() || validate_entry_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_names() {
        assert!(validate_entry_name("owner").is_ok());
        assert!(validate_entry_name("_private2").is_ok());
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name("2fast").is_err());
        assert!(validate_entry_name("has.dot").is_err());
        assert!(validate_entry_name("$signature").is_err());
        assert!(validate_entry_name(&"a".repeat(MAX_ENTRY_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_virtual_entries() {
        for entry in VirtualEntry::ALL {
            assert_eq!(VirtualEntry::from_name(entry.name()), Some(entry));
            assert!(is_declarable(entry.name()));
        }
        assert_eq!(
            VirtualEntry::SignerPublicKey.value_type(),
            PodValueType::EdDsaPublicKey
        );
        assert!(!is_declarable("$owner"));
    }
}
