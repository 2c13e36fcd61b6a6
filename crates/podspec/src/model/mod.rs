//! Data model types for PODs.
//!
//! This module contains the record-side types:
//! - Values (typed entry instances)
//! - Entry names and virtual entries
//! - Records (signed entry maps)
//! - Content identifiers
//! - Builders (ergonomic construction)

pub mod builder;
pub mod id;
pub mod name;
pub mod pod;
pub mod value;

pub use builder::PodBuilder;
pub use id::{content_id, format_hex};
pub use name::{validate_entry_name, VirtualEntry, CONTENT_ID, SIGNATURE, SIGNER_PUBLIC_KEY};
pub use pod::Pod;
pub use value::{is_valid_public_key, PodValue, PodValueType};
