//! Specification model, builders and audit.
//!
//! - Entry schemas (kind, constraints, optionality)
//! - Statements (membership relations between entries)
//! - Single-pod and group specifications
//! - Builders and the audit pass that guards them

pub mod audit;
pub mod builder;
pub mod entry;
pub mod group;
pub mod pod_spec;
pub mod statement;

pub use audit::{audit_group, audit_spec};
pub use builder::{build_group, build_spec, PodGroupSpecBuilder, PodSpecBuilder};
pub use entry::{Constraint, EntrySchema};
pub use group::PodGroupSpec;
pub use pod_spec::PodSpec;
pub use statement::{EntryRef, Membership, MembershipTarget, Statement, StatementKind};
