//! Validation of records and record groups against specifications.
//!
//! Validation never fails for malformed candidate data: every problem is
//! collected into a [`ValidationResult::Failure`] so callers can surface all
//! violations at once. Issue order is deterministic (entries and statements
//! are visited in name order).
//!
//! Membership compares values kind-strictly: a `cryptographic` value never
//! equals an `eddsa_pubkey`, even when both encode the same key. A group
//! statement such as `A.owner isMemberOf [B.$signerPublicKey]` therefore only
//! succeeds when `A.owner` is declared `eddsa_pubkey`; declaring it
//! `cryptographic` is rejected when the statement is added, because the
//! comparison could never hold.

pub mod entry;
pub(crate) mod statement;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::name::{VirtualEntry, SIGNER_PUBLIC_KEY};
use crate::model::{Pod, PodValue, PodValueType};
use crate::spec::{EntryRef, PodGroupSpec, PodSpec, Statement};
use self::statement::{evaluate, Resolution, Resolver};

pub use entry::validate_entry;

/// Closed set of issue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required entry (or group member) is absent.
    MissingEntry,
    /// A present value has a different kind than declared.
    WrongType,
    /// A value violates one of its entry's constraints.
    ConstraintViolated,
    /// A membership statement does not hold.
    StatementFailed,
    /// A statement references an entry with no value to compare.
    MalformedReference,
    /// Strict mode only: the record carries an undeclared entry.
    UnexpectedEntry,
    /// A group label was supplied with more than one record.
    DuplicatePod,
}

impl IssueCode {
    /// Returns the stable code string (e.g., `"missing_entry"`).
    pub fn code(&self) -> &'static str {
        match self {
            IssueCode::MissingEntry => "missing_entry",
            IssueCode::WrongType => "wrong_type",
            IssueCode::ConstraintViolated => "constraint_violated",
            IssueCode::StatementFailed => "statement_failed",
            IssueCode::MalformedReference => "malformed_reference",
            IssueCode::UnexpectedEntry => "unexpected_entry",
            IssueCode::DuplicatePod => "duplicate_pod",
        }
    }
}

/// One structured validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    /// Locators from the outermost scope inward: `[label?, entry or statement]`.
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(code: IssueCode, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.code(), self.path.join("."), self.message)
    }
}

/// Either a validated value or every issue found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult<T> {
    Success(T),
    Failure(Vec<Issue>),
}

impl<T> ValidationResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success(_))
    }

    /// Issues found; empty on success.
    pub fn issues(&self) -> &[Issue] {
        match self {
            ValidationResult::Success(_) => &[],
            ValidationResult::Failure(issues) => issues,
        }
    }

    /// Returns the validated value, discarding issues.
    pub fn ok(self) -> Option<T> {
        match self {
            ValidationResult::Success(value) => Some(value),
            ValidationResult::Failure(_) => None,
        }
    }

    /// Converts into a `Result` with the issues as the error.
    pub fn into_result(self) -> Result<T, Vec<Issue>> {
        match self {
            ValidationResult::Success(value) => Ok(value),
            ValidationResult::Failure(issues) => Err(issues),
        }
    }

    /// Maps the validated value, keeping issues as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            ValidationResult::Success(value) => ValidationResult::Success(f(value)),
            ValidationResult::Failure(issues) => ValidationResult::Failure(issues),
        }
    }

    fn from_issues(issues: Vec<Issue>, value: T) -> Self {
        if issues.is_empty() {
            ValidationResult::Success(value)
        } else {
            ValidationResult::Failure(issues)
        }
    }
}

/// Options for validation and query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Report record entries (and group members) the spec does not declare.
    #[serde(default)]
    pub strict: bool,
}

impl ValidateOptions {
    /// Creates default (non-strict) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates strict options.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// A record that passed validation, with typed accessors.
///
/// Accessors return `None` only when the entry is not declared with the
/// requested kind, or is optional and absent.
#[derive(Debug, Clone, Copy)]
pub struct ValidPod<'a> {
    spec: &'a PodSpec,
    pod: &'a Pod,
}

impl<'a> ValidPod<'a> {
    pub fn pod(&self) -> &'a Pod {
        self.pod
    }

    pub fn spec(&self) -> &'a PodSpec {
        self.spec
    }

    fn declares(&self, name: &str, ty: PodValueType) -> bool {
        match self.spec.entry(name) {
            Some(schema) => schema.value_type() == ty,
            None => VirtualEntry::from_name(name).is_some_and(|v| v.value_type() == ty),
        }
    }

    /// Value of a declared (or virtual) entry.
    pub fn entry(&self, name: &str) -> Option<Cow<'a, PodValue>> {
        if self.spec.entry(name).is_none() && VirtualEntry::from_name(name).is_none() {
            return None;
        }
        self.pod.get(name)
    }

    /// Text of a declared string entry.
    pub fn string(&self, name: &str) -> Option<Cow<'a, str>> {
        if !self.declares(name, PodValueType::String) {
            return None;
        }
        match self.pod.get(name)? {
            Cow::Borrowed(value) => value.as_string().map(Cow::Borrowed),
            Cow::Owned(PodValue::String(s)) => Some(Cow::Owned(s)),
            Cow::Owned(_) => None,
        }
    }

    /// Integer of a declared int entry.
    pub fn int(&self, name: &str) -> Option<i64> {
        if !self.declares(name, PodValueType::Int) {
            return None;
        }
        self.pod.entries().get(name)?.as_int()
    }

    /// Field element of a declared cryptographic entry.
    pub fn cryptographic(&self, name: &str) -> Option<&'a BigUint> {
        if !self.declares(name, PodValueType::Cryptographic) {
            return None;
        }
        self.pod.entries().get(name)?.as_cryptographic()
    }

    /// Public key of a declared public key entry, `$signerPublicKey` included.
    pub fn eddsa_pubkey(&self, name: &str) -> Option<&'a str> {
        if !self.declares(name, PodValueType::EdDsaPublicKey) {
            return None;
        }
        if name == SIGNER_PUBLIC_KEY {
            return Some(self.pod.signer_public_key());
        }
        self.pod.entries().get(name)?.as_eddsa_pubkey()
    }

    pub fn signature(&self) -> &'a str {
        self.pod.signature()
    }
}

/// A group of records that passed validation, keyed by label.
#[derive(Debug, Clone)]
pub struct ValidGroup<'a> {
    pods: BTreeMap<String, ValidPod<'a>>,
}

impl<'a> ValidGroup<'a> {
    pub fn get(&self, label: &str) -> Option<&ValidPod<'a>> {
        self.pods.get(label)
    }

    pub fn pods(&self) -> &BTreeMap<String, ValidPod<'a>> {
        &self.pods
    }
}

/// Validates `pod` against `spec` with default options.
pub fn validate_pod<'a>(spec: &'a PodSpec, pod: &'a Pod) -> ValidationResult<ValidPod<'a>> {
    validate_pod_with_options(spec, pod, &ValidateOptions::default())
}

/// Validates `pod` against `spec`.
///
/// Checks every declared entry, then every statement, and reports all issues.
pub fn validate_pod_with_options<'a>(
    spec: &'a PodSpec,
    pod: &'a Pod,
    options: &ValidateOptions,
) -> ValidationResult<ValidPod<'a>> {
    let mut issues = Vec::new();
    let mut resolver = Resolver::default();
    resolver.add_pod(None, pod);

    check_entries(spec, pod, None, options, &mut resolver, &mut issues);
    check_statements(spec.statements(), None, &mut resolver, &mut issues);

    debug!(
        entries = spec.entries().len(),
        statements = spec.statements().len(),
        issues = issues.len(),
        "validated pod"
    );
    ValidationResult::from_issues(issues, ValidPod { spec, pod })
}

/// Validates labelled records against `group` with default options.
pub fn validate_group<'a, I, L>(group: &'a PodGroupSpec, pods: I) -> ValidationResult<ValidGroup<'a>>
where
    I: IntoIterator<Item = (L, &'a Pod)>,
    L: Into<String>,
{
    validate_group_with_options(group, pods, &ValidateOptions::default())
}

/// Validates labelled records against `group`.
///
/// Each member is validated with the single-record algorithm (its own
/// statements included), then the group's cross-pod statements are
/// evaluated. A failing member does not stop the others from being checked.
/// A label supplied more than once is reported and only its first record is
/// validated.
pub fn validate_group_with_options<'a, I, L>(
    group: &'a PodGroupSpec,
    pods: I,
    options: &ValidateOptions,
) -> ValidationResult<ValidGroup<'a>>
where
    I: IntoIterator<Item = (L, &'a Pod)>,
    L: Into<String>,
{
    let mut issues = Vec::new();
    let mut provided: BTreeMap<String, &'a Pod> = BTreeMap::new();
    for (label, pod) in pods {
        let label = label.into();
        if provided.contains_key(&label) {
            issues.push(Issue::new(
                IssueCode::DuplicatePod,
                vec![label.clone()],
                format!("pod {label:?} was supplied more than once; the first record is used"),
            ));
            continue;
        }
        provided.insert(label, pod);
    }

    let mut resolver = Resolver::default();
    let mut members = BTreeMap::new();

    for (label, spec) in group.pods() {
        let Some(&pod) = provided.get(label) else {
            issues.push(Issue::new(
                IssueCode::MissingEntry,
                vec![label.clone()],
                format!("pod {label:?} is missing from the group"),
            ));
            continue;
        };
        let label_ref = Some(label.as_str());
        resolver.add_pod(label_ref, pod);

        let before = issues.len();
        check_entries(spec, pod, label_ref, options, &mut resolver, &mut issues);
        check_statements(spec.statements(), label_ref, &mut resolver, &mut issues);
        if issues.len() == before {
            members.insert(label.clone(), ValidPod { spec, pod });
        }
    }

    if options.strict {
        for label in provided.keys().filter(|l| group.pod(l).is_none()) {
            issues.push(Issue::new(
                IssueCode::UnexpectedEntry,
                vec![label.clone()],
                format!("pod {label:?} is not part of the group"),
            ));
        }
    }

    check_statements(group.statements(), None, &mut resolver, &mut issues);

    debug!(
        pods = group.pods().len(),
        statements = group.statements().len(),
        issues = issues.len(),
        "validated group"
    );
    ValidationResult::from_issues(issues, ValidGroup { pods: members })
}

/// Checks the declared entries of one record, recording each resolution.
fn check_entries<'a>(
    spec: &'a PodSpec,
    pod: &'a Pod,
    label: Option<&str>,
    options: &ValidateOptions,
    resolver: &mut Resolver<'a>,
    issues: &mut Vec<Issue>,
) {
    for (name, schema) in spec.entries() {
        let path = locate(label, name);
        let candidate = pod.get(name);
        let failed = match validate_entry(schema, candidate.as_deref(), &path) {
            ValidationResult::Success(_) => None,
            ValidationResult::Failure(found) => Some(found),
        };
        let resolution = match (failed, candidate) {
            (Some(found), _) => {
                issues.extend(found);
                Resolution::Invalid
            }
            (None, Some(value)) => Resolution::Present(value),
            (None, None) => Resolution::Absent,
        };
        let reference = match label {
            Some(label) => EntryRef::qualified(label, name.as_str()),
            None => EntryRef::entry(name.as_str()),
        };
        resolver.record(reference, resolution);
    }

    if options.strict {
        for name in pod.entries().keys().filter(|n| spec.entry(n).is_none()) {
            issues.push(Issue::new(
                IssueCode::UnexpectedEntry,
                locate(label, name),
                "entry is not declared by the spec",
            ));
        }
    }
}

/// Evaluates statements in name order; member statements are qualified with
/// their pod's label first.
fn check_statements(
    statements: &BTreeMap<String, Statement>,
    label: Option<&str>,
    resolver: &mut Resolver<'_>,
    issues: &mut Vec<Issue>,
) {
    for (name, statement) in statements {
        let path = locate(label, name);
        let issue = match label {
            Some(label) => evaluate(name, &statement.in_pod(label), path, resolver),
            None => evaluate(name, statement, path, resolver),
        };
        issues.extend(issue);
    }
}

fn locate(label: Option<&str>, name: &str) -> Vec<String> {
    match label {
        Some(label) => vec![label.to_string(), name.to_string()],
        None => vec![name.to_string()],
    }
}
