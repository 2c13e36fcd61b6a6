//! Audited single-pod specifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SpecAuditError;
use crate::model::Pod;
use crate::query::{query, Query};
use crate::spec::audit::{audit_parts, unknown_statement_type};
use crate::spec::statement::RawStatement;
use crate::spec::{EntrySchema, PodSpecBuilder, Statement};
use crate::validate::{validate_pod, ValidPod, ValidationResult};

/// Expected entries and statements for one record.
///
/// A `PodSpec` can only be obtained from [`PodSpecBuilder::build`] or by
/// decoding, both of which audit it, so every instance is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPodSpec")]
pub struct PodSpec {
    entries: BTreeMap<String, EntrySchema>,
    statements: BTreeMap<String, Statement>,
}

impl PodSpec {
    /// Starts an empty builder.
    pub fn builder() -> PodSpecBuilder {
        PodSpecBuilder::new()
    }

    /// Audits and wraps the given parts.
    pub(crate) fn from_parts(
        entries: BTreeMap<String, EntrySchema>,
        statements: BTreeMap<String, Statement>,
    ) -> Result<PodSpec, SpecAuditError> {
        audit_parts(&entries, &statements)?;
        Ok(PodSpec {
            entries,
            statements,
        })
    }

    /// Declared entries by name.
    pub fn entries(&self) -> &BTreeMap<String, EntrySchema> {
        &self.entries
    }

    /// Statements by name.
    pub fn statements(&self) -> &BTreeMap<String, Statement> {
        &self.statements
    }

    pub fn entry(&self, name: &str) -> Option<&EntrySchema> {
        self.entries.get(name)
    }

    pub fn statement(&self, name: &str) -> Option<&Statement> {
        self.statements.get(name)
    }

    /// Validates `pod` against this spec with default options.
    pub fn validate<'a>(&'a self, pod: &'a Pod) -> ValidationResult<ValidPod<'a>> {
        validate_pod(self, pod)
    }

    /// Lazily filters `pods` down to those that validate against this spec.
    pub fn query<'a, I>(&'a self, pods: I) -> Query<'a, I::IntoIter>
    where
        I: IntoIterator<Item = &'a Pod>,
    {
        query(self, pods)
    }
}

/// Plain-data form read before audit.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPodSpec {
    entries: BTreeMap<String, EntrySchema>,
    #[serde(default)]
    statements: BTreeMap<String, RawStatement>,
}

impl TryFrom<RawPodSpec> for PodSpec {
    type Error = SpecAuditError;

    fn try_from(raw: RawPodSpec) -> Result<Self, Self::Error> {
        PodSpec::from_parts(raw.entries, convert_statements(raw.statements)?)
    }
}

pub(crate) fn convert_statements(
    raw: BTreeMap<String, RawStatement>,
) -> Result<BTreeMap<String, Statement>, SpecAuditError> {
    raw.into_iter()
        .map(|(name, statement)| match statement.into_statement() {
            Ok(statement) => Ok((name, statement)),
            Err(kind) => Err(unknown_statement_type(&name, kind)),
        })
        .collect()
}
