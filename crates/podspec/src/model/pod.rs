//! Signed POD records.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PodError;
use crate::model::id::content_id;
use crate::model::name::{validate_entry_name, VirtualEntry};
use crate::model::value::is_valid_public_key;
use crate::model::PodValue;

/// An immutable, signed mapping from entry name to typed value.
///
/// Entries are kept sorted by name. The signature is carried as an opaque
/// string and doubles as the record's identity for deduplication; it is never
/// verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPod", rename_all = "camelCase")]
pub struct Pod {
    entries: BTreeMap<String, PodValue>,
    signature: String,
    signer_public_key: String,
}

impl Pod {
    /// Creates a record after checking entry names, values and signer key.
    pub fn new<I, K>(
        entries: I,
        signature: impl Into<String>,
        signer_public_key: impl Into<String>,
    ) -> Result<Pod, PodError>
    where
        I: IntoIterator<Item = (K, PodValue)>,
        K: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, value) in entries {
            let name = name.into();
            if let Err(reason) = validate_entry_name(&name) {
                return Err(PodError::InvalidEntryName { name, reason });
            }
            if let Some(reason) = value.validate() {
                return Err(PodError::InvalidValue { name, reason });
            }
            if map.contains_key(&name) {
                return Err(PodError::DuplicateEntry { name });
            }
            map.insert(name, value);
        }

        let signature = signature.into();
        if signature.is_empty() {
            return Err(PodError::EmptySignature);
        }
        let signer_public_key = signer_public_key.into();
        if !is_valid_public_key(&signer_public_key) {
            return Err(PodError::InvalidSignerPublicKey {
                key: signer_public_key,
            });
        }

        Ok(Pod {
            entries: map,
            signature,
            signer_public_key,
        })
    }

    /// Stored entries, sorted by name.
    pub fn entries(&self) -> &BTreeMap<String, PodValue> {
        &self.entries
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn signer_public_key(&self) -> &str {
        &self.signer_public_key
    }

    /// Content-derived identifier (hex SHA-256 over the sorted entries).
    pub fn content_id(&self) -> String {
        content_id(&self.entries)
    }

    /// Resolves a stored or virtual entry by name.
    ///
    /// Virtual entries are computed on each call and returned owned.
    pub fn get(&self, name: &str) -> Option<Cow<'_, PodValue>> {
        if let Some(value) = self.entries.get(name) {
            return Some(Cow::Borrowed(value));
        }
        VirtualEntry::from_name(name).map(|entry| Cow::Owned(self.virtual_value(entry)))
    }

    /// Computes the value of a virtual entry.
    pub fn virtual_value(&self, entry: VirtualEntry) -> PodValue {
        match entry {
            VirtualEntry::ContentId => PodValue::String(self.content_id()),
            VirtualEntry::Signature => PodValue::String(self.signature.clone()),
            VirtualEntry::SignerPublicKey => {
                PodValue::EdDsaPublicKey(self.signer_public_key.clone())
            }
        }
    }
}

/// Plain-data form read before the record is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPod {
    entries: BTreeMap<String, PodValue>,
    signature: String,
    signer_public_key: String,
}

impl TryFrom<RawPod> for Pod {
    type Error = PodError;

    fn try_from(raw: RawPod) -> Result<Self, Self::Error> {
        Pod::new(raw.entries, raw.signature, raw.signer_public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> String {
        format!("{:02x}", n).repeat(32)
    }

    #[test]
    fn test_pod_new_sorts_entries() {
        let pod = Pod::new(
            [("zeta", PodValue::int(1)), ("alpha", PodValue::string("a"))],
            "sig",
            key(1),
        )
        .unwrap();
        let names: Vec<_> = pod.entries().keys().cloned().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_pod_new_rejects_bad_input() {
        let err = Pod::new([("bad name", PodValue::int(1))], "sig", key(1)).unwrap_err();
        assert!(matches!(err, PodError::InvalidEntryName { .. }));

        let err = Pod::new(
            [("a", PodValue::int(1)), ("a", PodValue::int(2))],
            "sig",
            key(1),
        )
        .unwrap_err();
        assert_eq!(err, PodError::DuplicateEntry { name: "a".into() });

        let err = Pod::new([("a", PodValue::eddsa_pubkey("nope"))], "sig", key(1)).unwrap_err();
        assert!(matches!(err, PodError::InvalidValue { .. }));

        let err = Pod::new(Vec::<(String, PodValue)>::new(), "", key(1)).unwrap_err();
        assert_eq!(err, PodError::EmptySignature);

        let err = Pod::new(Vec::<(String, PodValue)>::new(), "sig", "short").unwrap_err();
        assert!(matches!(err, PodError::InvalidSignerPublicKey { .. }));
    }

    #[test]
    fn test_virtual_entries_resolve() {
        let pod = Pod::new([("a", PodValue::int(1))], "sig-1", key(7)).unwrap();
        assert_eq!(
            pod.get("$signature").unwrap().into_owned(),
            PodValue::string("sig-1")
        );
        assert_eq!(
            pod.get("$signerPublicKey").unwrap().into_owned(),
            PodValue::eddsa_pubkey(key(7))
        );
        assert_eq!(
            pod.get("$contentID").unwrap().into_owned(),
            PodValue::String(pod.content_id())
        );
        assert!(pod.get("missing").is_none());
        assert!(matches!(pod.get("a"), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn test_content_id_ignores_signature() {
        let a = Pod::new([("a", PodValue::int(1))], "sig-1", key(1)).unwrap();
        let b = Pod::new([("a", PodValue::int(1))], "sig-2", key(2)).unwrap();
        assert_eq!(a.content_id(), b.content_id());
    }

    #[test]
    fn test_pod_json_revalidates() {
        let pod = Pod::new([("a", PodValue::int(1))], "sig", key(3)).unwrap();
        let json = serde_json::to_string(&pod).unwrap();
        assert!(json.contains("signerPublicKey"));
        let back: Pod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pod);

        let bad = json.replace(&key(3), "short");
        assert!(serde_json::from_str::<Pod>(&bad).is_err());
    }
}
