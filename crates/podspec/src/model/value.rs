//! Value types for POD entries.
//!
//! Every entry value carries its kind tag alongside a kind-specific native
//! representation.

use std::cmp::Ordering;
use std::fmt;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::limits::{CRYPTOGRAPHIC_MAX, PUBLIC_KEY_LEN};

/// Kind tag of an entry value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PodValueType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "cryptographic")]
    Cryptographic,
    #[serde(rename = "eddsa_pubkey")]
    EdDsaPublicKey,
}

impl PodValueType {
    /// Returns the wire name of this kind (e.g., `"eddsa_pubkey"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PodValueType::String => "string",
            PodValueType::Int => "int",
            PodValueType::Cryptographic => "cryptographic",
            PodValueType::EdDsaPublicKey => "eddsa_pubkey",
        }
    }

    /// Parses a wire name back into a kind.
    pub fn parse(s: &str) -> Option<PodValueType> {
        match s {
            "string" => Some(PodValueType::String),
            "int" => Some(PodValueType::Int),
            "cryptographic" => Some(PodValueType::Cryptographic),
            "eddsa_pubkey" => Some(PodValueType::EdDsaPublicKey),
            _ => None,
        }
    }

    /// Returns true for kinds with a total numeric order.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PodValueType::Int | PodValueType::Cryptographic)
    }

    fn tag(self) -> u8 {
        match self {
            PodValueType::String => 1,
            PodValueType::Int => 2,
            PodValueType::Cryptographic => 3,
            PodValueType::EdDsaPublicKey => 4,
        }
    }
}

impl fmt::Display for PodValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed entry value.
///
/// Serializes as `{"type": "<kind>", "value": <native>}`; cryptographic values
/// are carried as decimal strings so they survive JSON number limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PodValue {
    /// UTF-8 string.
    #[serde(rename = "string")]
    String(String),

    /// Signed 64-bit integer.
    #[serde(rename = "int")]
    Int(i64),

    /// Unsigned field element used for commitments and identifiers.
    #[serde(rename = "cryptographic", with = "decimal")]
    Cryptographic(BigUint),

    /// Encoded EdDSA public key (hex or base64).
    #[serde(rename = "eddsa_pubkey")]
    EdDsaPublicKey(String),
}

impl PodValue {
    /// Creates a string value.
    pub fn string(value: impl Into<String>) -> Self {
        PodValue::String(value.into())
    }

    /// Creates an int value.
    pub fn int(value: i64) -> Self {
        PodValue::Int(value)
    }

    /// Creates a cryptographic value.
    pub fn cryptographic(value: impl Into<BigUint>) -> Self {
        PodValue::Cryptographic(value.into())
    }

    /// Creates a public key value.
    pub fn eddsa_pubkey(value: impl Into<String>) -> Self {
        PodValue::EdDsaPublicKey(value.into())
    }

    /// Returns the kind tag of this value.
    pub fn value_type(&self) -> PodValueType {
        match self {
            PodValue::String(_) => PodValueType::String,
            PodValue::Int(_) => PodValueType::Int,
            PodValue::Cryptographic(_) => PodValueType::Cryptographic,
            PodValue::EdDsaPublicKey(_) => PodValueType::EdDsaPublicKey,
        }
    }

    /// Returns the text of a string value.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PodValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer of an int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PodValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the field element of a cryptographic value.
    pub fn as_cryptographic(&self) -> Option<&BigUint> {
        match self {
            PodValue::Cryptographic(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the encoded key of a public key value.
    pub fn as_eddsa_pubkey(&self) -> Option<&str> {
        match self {
            PodValue::EdDsaPublicKey(k) => Some(k),
            _ => None,
        }
    }

    /// Orders two numeric values of the same kind.
    ///
    /// Returns `None` when either value is non-numeric or the kinds differ.
    pub fn numeric_cmp(&self, other: &PodValue) -> Option<Ordering> {
        match (self, other) {
            (PodValue::Int(a), PodValue::Int(b)) => Some(a.cmp(b)),
            (PodValue::Cryptographic(a), PodValue::Cryptographic(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Validates this value according to its kind's rules.
    ///
    /// Returns an error description if invalid, None if valid.
    pub fn validate(&self) -> Option<&'static str> {
        match self {
            PodValue::Cryptographic(v) => {
                if *v > *CRYPTOGRAPHIC_MAX {
                    return Some("cryptographic value exceeds the field modulus");
                }
            }
            PodValue::EdDsaPublicKey(k) => {
                if !is_valid_public_key(k) {
                    return Some("public key is not a 32-byte hex or base64 key");
                }
            }
            PodValue::String(_) | PodValue::Int(_) => {}
        }
        None
    }

    /// Appends the canonical encoding used for content identifiers.
    ///
    /// ```text
    /// tag(u8) || len(u32 BE) || payload
    /// ```
    pub(crate) fn write_canonical(&self, out: &mut Vec<u8>) {
        out.push(self.value_type().tag());
        let payload = match self {
            PodValue::String(s) | PodValue::EdDsaPublicKey(s) => s.as_bytes().to_vec(),
            PodValue::Int(v) => v.to_be_bytes().to_vec(),
            PodValue::Cryptographic(v) => v.to_bytes_be(),
        };
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
    }
}

impl fmt::Display for PodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodValue::String(s) => write!(f, "{s:?}"),
            PodValue::Int(v) => write!(f, "{v}"),
            PodValue::Cryptographic(v) => write!(f, "{v}n"),
            PodValue::EdDsaPublicKey(k) => write!(f, "pubkey:{k}"),
        }
    }
}

impl From<&str> for PodValue {
    fn from(value: &str) -> Self {
        PodValue::String(value.to_string())
    }
}

impl From<String> for PodValue {
    fn from(value: String) -> Self {
        PodValue::String(value)
    }
}

impl From<i64> for PodValue {
    fn from(value: i64) -> Self {
        PodValue::Int(value)
    }
}

impl From<BigUint> for PodValue {
    fn from(value: BigUint) -> Self {
        PodValue::Cryptographic(value)
    }
}

/// Checks the encoding of an EdDSA public key.
///
/// Accepts 32 raw bytes as 64 hex characters, or as canonical base64 with
/// (44 chars) or without (43 chars) padding.
pub fn is_valid_public_key(key: &str) -> bool {
    let decoded = match key.len() {
        64 => hex::decode(key).ok(),
        43 => STANDARD_NO_PAD.decode(key).ok(),
        44 => STANDARD.decode(key).ok(),
        _ => None,
    };
    decoded.is_some_and(|bytes| bytes.len() == PUBLIC_KEY_LEN)
}

/// Serde adapter carrying a `BigUint` as a decimal string.
mod decimal {
    use std::str::FromStr;

    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str(&s).map_err(de::Error::custom)
    }
}
