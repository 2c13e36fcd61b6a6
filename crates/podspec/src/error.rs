//! Error types for record construction, specification building and audit.
//!
//! Data-dependent validation outcomes are not errors; they are reported as
//! [`Issue`](crate::validate::Issue) lists inside a
//! [`ValidationResult`](crate::validate::ValidationResult).

use std::fmt;

use thiserror::Error;

use crate::model::PodValueType;

/// Error constructing a [`Pod`](crate::model::Pod).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PodError {
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidEntryName { name: String, reason: &'static str },

    #[error("duplicate entry name {name:?}")]
    DuplicateEntry { name: String },

    #[error("invalid value for entry {name:?}: {reason}")]
    InvalidValue { name: String, reason: &'static str },

    #[error("signature must not be empty")]
    EmptySignature,

    #[error("signer public key {key:?} is not a 32-byte hex or base64 key")]
    InvalidSignerPublicKey { key: String },
}

/// Fatal, construction-time defect in a specification.
///
/// A specification that fails audit is never handed to the validator or the
/// query engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecAuditError {
    #[error("statement {statement:?} has unrecognized type {kind:?}")]
    UnknownStatementType { statement: String, kind: String },

    #[error("statement {statement:?} references undeclared entry {entry:?}")]
    UnknownEntry { statement: String, entry: String },

    #[error("statement {statement:?} references unknown pod {pod:?}")]
    UnknownPod { statement: String, pod: String },

    #[error("statement {statement:?} uses qualified reference {reference:?} inside a single-pod spec")]
    QualifiedReferenceInPod { statement: String, reference: String },

    #[error("statement {statement:?} uses unqualified reference {reference:?} inside a group spec")]
    UnqualifiedReferenceInGroup { statement: String, reference: String },

    #[error("statement {statement:?} does not reference any entry")]
    EmptyStatement { statement: String },

    #[error("statement {statement:?} ranges over {arity} entries (maximum {max})")]
    ArityTooLarge {
        statement: String,
        arity: usize,
        max: usize,
    },

    #[error("statement {statement:?} tuple {index} has {actual} elements, expected {expected}")]
    ArityMismatch {
        statement: String,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid entry name {name:?}: {reason}")]
    InvalidEntryName { name: String, reason: &'static str },

    #[error("invalid pod label {label:?}: {reason}")]
    InvalidPodLabel { label: String, reason: &'static str },

    #[error("virtual entry {entry:?} must be declared as {expected}, found {actual}")]
    VirtualEntryType {
        entry: String,
        expected: PodValueType,
        actual: PodValueType,
    },

    #[error("invalid range on entry {entry:?}: {reason}")]
    InvalidRange { entry: String, reason: &'static str },

    #[error("statement {statement:?} tuple {index} element {position} is {actual}, expected {expected}")]
    TupleKindMismatch {
        statement: String,
        index: usize,
        position: usize,
        expected: PodValueType,
        actual: PodValueType,
    },

    #[error("membership constraint on entry {entry:?} lists a {actual} value, expected {expected}")]
    MemberKindMismatch {
        entry: String,
        expected: PodValueType,
        actual: PodValueType,
    },
}

/// Namespace a builder name is unique within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Entry,
    Statement,
    Pod,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Entry => "entry",
            Namespace::Statement => "statement",
            Namespace::Pod => "pod",
        })
    }
}

/// Error while assembling a specification with a builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("duplicate {namespace} name {name:?}")]
    DuplicateName { namespace: Namespace, name: String },

    #[error(transparent)]
    Audit(#[from] SpecAuditError),
}

/// A decoded proof request that its own group would not produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofRequestError {
    #[error("request gpc version {request} does not match group gpc version {group}")]
    VersionMismatch { request: u32, group: u32 },

    #[error("membership lists do not match the group's statements")]
    MembershipListMismatch,
}

/// Error crossing the plain-data serialization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Audit(#[from] SpecAuditError),

    #[error(transparent)]
    Pod(#[from] PodError),

    #[error(transparent)]
    ProofRequest(#[from] ProofRequestError),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}
