//! Content-derived identifiers for PODs.
//!
//! A record's content ID depends only on its entries, never on the signature
//! or signer, so two records signed over the same data share it.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::model::PodValue;

/// Domain separator for content ID derivation.
const CONTENT_ID_PREFIX: &[u8] = b"podspec:content:";

/// Derives the content ID of a set of entries.
///
/// ```text
/// content_id = hex(SHA-256("podspec:content:" || for each entry in name order:
///                          len(name) || name || canonical(value)))
/// ```
pub fn content_id(entries: &BTreeMap<String, PodValue>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(CONTENT_ID_PREFIX);

    let mut buf = Vec::new();
    for (name, value) in entries {
        buf.clear();
        buf.extend_from_slice(&(name.len() as u32).to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        value.write_canonical(&mut buf);
        hasher.update(&buf);
    }

    format_hex(&hasher.finalize())
}

/// Formats bytes as lowercase hex.
pub fn format_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}
