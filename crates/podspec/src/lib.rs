//! podspec: specifications, validation and queries for signed POD records.
//!
//! A POD is an immutable mapping from entry names to typed scalar values,
//! carried with an opaque signature and the signer's public key. This crate
//! lets a consumer declare what records it expects and check candidates
//! against that declaration.
//!
//! # Overview
//!
//! - **Specifications** declare entries (kind, constraints, optionality) and
//!   membership statements relating entry values to candidate tuples
//! - **Group specifications** label several specifications and relate
//!   entries across them (`ticket.owner` vs `identity.$signerPublicKey`)
//! - **Validation** reports every problem as a structured issue instead of
//!   stopping at the first one
//! - **Queries** lazily filter a record collection by specification
//! - **Proof requests** wrap a group specification for an external prover
//!
//! # Quick Start
//!
//! ```rust
//! use podspec::spec::{build_spec, EntrySchema, Statement};
//! use podspec::{PodBuilder, PodValue};
//!
//! let spec = build_spec()
//!     .entry("event", EntrySchema::string())?
//!     .entry("seat", EntrySchema::int().in_range(1i64, 500i64))?
//!     .statement("devcon_only", Statement::one_of("event", [PodValue::string("devcon")]))?
//!     .build()?;
//!
//! let key = "ab".repeat(32);
//! let ticket = PodBuilder::new()
//!     .string("event", "devcon")
//!     .int("seat", 42)
//!     .build("signature", key.clone())?;
//! let stranger = PodBuilder::new()
//!     .string("event", "ethcc")
//!     .int("seat", 7)
//!     .build("other-signature", key)?;
//!
//! let valid = spec.validate(&ticket).ok().unwrap();
//! assert_eq!(valid.int("seat"), Some(42));
//!
//! let issues = spec.validate(&stranger).issues().to_vec();
//! assert_eq!(issues.len(), 1);
//!
//! let pods = vec![ticket, stranger];
//! assert_eq!(spec.query(&pods).count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`model`]: Records, values, entry names and content IDs
//! - [`spec`]: Entry schemas, statements, specifications, builders and audit
//! - [`validate`]: Record and group validation
//! - [`query`]: Filtering record collections
//! - [`proof`]: Proof request assembly and the prover seam
//! - [`codec`]: JSON encoding across process boundaries
//! - [`error`]: Error types
//! - [`limits`]: Value bounds and protocol constants
//!
//! # Trust
//!
//! Signatures are never verified here. Records are assumed to come from a
//! collection that has already authenticated them.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod proof;
pub mod query;
pub mod spec;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{decode_group, decode_pod, decode_spec, encode_group, encode_pod, encode_spec};
pub use error::{BuildError, CodecError, PodError, ProofRequestError, SpecAuditError};
pub use model::{Pod, PodBuilder, PodValue, PodValueType};
pub use proof::{build_proof_request, ProofRequest, ProofSystem};
pub use query::{query, query_group, Query};
pub use spec::{
    build_group, build_spec, EntryRef, EntrySchema, PodGroupSpec, PodSpec, Statement,
};
pub use validate::{
    validate_group, validate_pod, Issue, IssueCode, ValidGroup, ValidPod, ValidateOptions,
    ValidationResult,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
