//! Specification self-check.
//!
//! Audit runs whenever a specification is built or decoded; a specification
//! value that exists has passed it. It verifies that every statement is of a
//! recognized kind, that its references resolve, that tuple arities agree,
//! and that entry schemas are internally consistent.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::SpecAuditError;
use crate::limits::MAX_TUPLE_ARITY;
use crate::model::name::{validate_entry_name, VirtualEntry};
use crate::model::PodValueType;
use crate::spec::{
    Constraint, EntryRef, EntrySchema, MembershipTarget, PodGroupSpec, PodSpec, Statement,
};

/// Where statement references are resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// Unqualified references into one spec's entries.
    Pod(&'a BTreeMap<String, EntrySchema>),
    /// `label.entry` references into a group's member specs.
    Group(&'a BTreeMap<String, PodSpec>),
}

impl Scope<'_> {
    /// Resolves `reference` to the kind of the entry it names.
    fn check_ref(
        &self,
        statement: &str,
        reference: &EntryRef,
    ) -> Result<PodValueType, SpecAuditError> {
        let entries = match (self, reference.pod()) {
            (Scope::Pod(entries), None) => *entries,
            (Scope::Pod(_), Some(_)) => {
                return Err(SpecAuditError::QualifiedReferenceInPod {
                    statement: statement.to_string(),
                    reference: reference.to_string(),
                });
            }
            (Scope::Group(_), None) => {
                return Err(SpecAuditError::UnqualifiedReferenceInGroup {
                    statement: statement.to_string(),
                    reference: reference.to_string(),
                });
            }
            (Scope::Group(pods), Some(label)) => match pods.get(label) {
                Some(spec) => spec.entries(),
                None => {
                    return Err(SpecAuditError::UnknownPod {
                        statement: statement.to_string(),
                        pod: label.to_string(),
                    });
                }
            },
        };

        let name = reference.entry_name();
        entries
            .get(name)
            .map(EntrySchema::value_type)
            .or_else(|| VirtualEntry::from_name(name).map(VirtualEntry::value_type))
            .ok_or_else(|| SpecAuditError::UnknownEntry {
                statement: statement.to_string(),
                entry: reference.to_string(),
            })
    }
}

/// Audits a single-pod specification.
pub fn audit_spec(spec: &PodSpec) -> Result<(), SpecAuditError> {
    audit_parts(spec.entries(), spec.statements())
}

/// Audits a group specification, including each member spec.
pub fn audit_group(group: &PodGroupSpec) -> Result<(), SpecAuditError> {
    audit_group_parts(group.pods(), group.statements())
}

pub(crate) fn audit_parts(
    entries: &BTreeMap<String, EntrySchema>,
    statements: &BTreeMap<String, Statement>,
) -> Result<(), SpecAuditError> {
    debug!(
        entries = entries.len(),
        statements = statements.len(),
        "auditing pod spec"
    );
    for (name, schema) in entries {
        logged(audit_entry(name, schema))?;
    }
    let scope = Scope::Pod(entries);
    for (name, statement) in statements {
        logged(audit_statement(name, statement, scope))?;
    }
    debug!("pod spec audit passed");
    Ok(())
}

pub(crate) fn audit_group_parts(
    pods: &BTreeMap<String, PodSpec>,
    statements: &BTreeMap<String, Statement>,
) -> Result<(), SpecAuditError> {
    debug!(
        pods = pods.len(),
        statements = statements.len(),
        "auditing group spec"
    );
    for (label, spec) in pods {
        logged(audit_label(label))?;
        audit_spec(spec)?;
    }
    let scope = Scope::Group(pods);
    for (name, statement) in statements {
        logged(audit_statement(name, statement, scope))?;
    }
    debug!("group spec audit passed");
    Ok(())
}

pub(crate) fn audit_label(label: &str) -> Result<(), SpecAuditError> {
    validate_entry_name(label).map_err(|reason| SpecAuditError::InvalidPodLabel {
        label: label.to_string(),
        reason,
    })
}

/// Checks an entry name and its schema.
pub(crate) fn audit_entry(name: &str, schema: &EntrySchema) -> Result<(), SpecAuditError> {
    if let Some(entry) = VirtualEntry::from_name(name) {
        if schema.value_type() != entry.value_type() {
            return Err(SpecAuditError::VirtualEntryType {
                entry: name.to_string(),
                expected: entry.value_type(),
                actual: schema.value_type(),
            });
        }
    } else if let Err(reason) = validate_entry_name(name) {
        return Err(SpecAuditError::InvalidEntryName {
            name: name.to_string(),
            reason,
        });
    }

    for constraint in schema.constraints() {
        match constraint {
            Constraint::IsMemberOf { values } | Constraint::IsNotMemberOf { values } => {
                let expected = schema.value_type();
                if let Some(value) = values.iter().find(|v| v.value_type() != expected) {
                    return Err(SpecAuditError::MemberKindMismatch {
                        entry: name.to_string(),
                        expected,
                        actual: value.value_type(),
                    });
                }
            }
            Constraint::InRange { min, max } | Constraint::NotInRange { min, max } => {
                let invalid = |reason| SpecAuditError::InvalidRange {
                    entry: name.to_string(),
                    reason,
                };
                if !schema.value_type().is_numeric() {
                    return Err(invalid("ranges apply only to int and cryptographic entries"));
                }
                if min.value_type() != schema.value_type() || max.value_type() != schema.value_type()
                {
                    return Err(invalid("range bounds must match the entry type"));
                }
                if min.numeric_cmp(max) == Some(Ordering::Greater) {
                    return Err(invalid("range minimum exceeds maximum"));
                }
                if min.validate().is_some() || max.validate().is_some() {
                    return Err(invalid("range bound is not a valid value"));
                }
            }
        }
    }
    Ok(())
}

/// Checks one statement's arity and references against `scope`.
pub(crate) fn audit_statement(
    name: &str,
    statement: &Statement,
    scope: Scope<'_>,
) -> Result<(), SpecAuditError> {
    let membership = match statement {
        Statement::IsMemberOf(m) | Statement::IsNotMemberOf(m) => m,
    };

    let arity = membership.entries.len();
    if arity == 0 {
        return Err(SpecAuditError::EmptyStatement {
            statement: name.to_string(),
        });
    }
    if arity > MAX_TUPLE_ARITY {
        return Err(SpecAuditError::ArityTooLarge {
            statement: name.to_string(),
            arity,
            max: MAX_TUPLE_ARITY,
        });
    }
    for (index, tuple) in membership.tuples.iter().enumerate() {
        if tuple.len() != arity {
            return Err(SpecAuditError::ArityMismatch {
                statement: name.to_string(),
                index,
                expected: arity,
                actual: tuple.len(),
            });
        }
    }

    let mut kinds = Vec::with_capacity(arity);
    for reference in &membership.entries {
        kinds.push(scope.check_ref(name, reference)?);
    }
    for (index, tuple) in membership.tuples.iter().enumerate() {
        for (position, (target, &expected)) in tuple.iter().zip(&kinds).enumerate() {
            let actual = match target {
                MembershipTarget::Value(value) => value.value_type(),
                MembershipTarget::Entry(reference) => scope.check_ref(name, reference)?,
            };
            if actual != expected {
                return Err(SpecAuditError::TupleKindMismatch {
                    statement: name.to_string(),
                    index,
                    position,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(())
}

/// Converts an unrecognized statement kind into an audit error.
pub(crate) fn unknown_statement_type(statement: &str, kind: String) -> SpecAuditError {
    let err = SpecAuditError::UnknownStatementType {
        statement: statement.to_string(),
        kind,
    };
    warn!(error = %err, "spec audit failed");
    err
}

pub(crate) fn logged(result: Result<(), SpecAuditError>) -> Result<(), SpecAuditError> {
    if let Err(err) = &result {
        warn!(error = %err, "spec audit failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PodValue;

    fn entries(pairs: &[(&str, EntrySchema)]) -> BTreeMap<String, EntrySchema> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let entries = entries(&[("a", EntrySchema::string())]);
        let st = Statement::one_of("missingField", [PodValue::string("x")]);
        let err = audit_statement("s", &st, Scope::Pod(&entries)).unwrap_err();
        assert_eq!(
            err,
            SpecAuditError::UnknownEntry {
                statement: "s".into(),
                entry: "missingField".into(),
            }
        );
    }

    #[test]
    fn test_virtual_reference_accepted() {
        let entries = entries(&[]);
        let st = Statement::one_of("$signerPublicKey", [PodValue::eddsa_pubkey("ab".repeat(32))]);
        assert!(audit_statement("s", &st, Scope::Pod(&entries)).is_ok());
    }

    #[test]
    fn test_qualified_reference_in_pod_rejected() {
        let entries = entries(&[("a", EntrySchema::string())]);
        let st = Statement::one_of("p.a", [PodValue::string("x")]);
        assert!(matches!(
            audit_statement("s", &st, Scope::Pod(&entries)),
            Err(SpecAuditError::QualifiedReferenceInPod { .. })
        ));
    }

    #[test]
    fn test_arity_checks() {
        let entries = entries(&[("a", EntrySchema::int()), ("b", EntrySchema::int())]);
        let scope = Scope::Pod(&entries);

        let empty = Statement::is_member_of(Vec::<&str>::new(), Vec::new());
        assert!(matches!(
            audit_statement("s", &empty, scope),
            Err(SpecAuditError::EmptyStatement { .. })
        ));

        let mismatch = Statement::is_member_of(["a", "b"], vec![vec![PodValue::int(1).into()]]);
        assert_eq!(
            audit_statement("s", &mismatch, scope).unwrap_err(),
            SpecAuditError::ArityMismatch {
                statement: "s".into(),
                index: 0,
                expected: 2,
                actual: 1,
            }
        );

        let wide = Statement::is_member_of(["a", "b", "a", "b", "a"], Vec::new());
        assert!(matches!(
            audit_statement("s", &wide, scope),
            Err(SpecAuditError::ArityTooLarge { arity: 5, .. })
        ));
    }

    #[test]
    fn test_entry_schema_checks() {
        assert!(audit_entry("a", &EntrySchema::int().in_range(0i64, 10i64)).is_ok());
        assert!(matches!(
            audit_entry("a", &EntrySchema::int().in_range(10i64, 0i64)),
            Err(SpecAuditError::InvalidRange { .. })
        ));
        assert!(matches!(
            audit_entry("a", &EntrySchema::string().in_range(0i64, 1i64)),
            Err(SpecAuditError::InvalidRange { .. })
        ));
        assert!(matches!(
            audit_entry("a", &EntrySchema::cryptographic().in_range(0i64, 1i64)),
            Err(SpecAuditError::InvalidRange { .. })
        ));
        assert!(matches!(
            audit_entry("$signerPublicKey", &EntrySchema::string()),
            Err(SpecAuditError::VirtualEntryType { .. })
        ));
        assert!(matches!(
            audit_entry("bad-name", &EntrySchema::string()),
            Err(SpecAuditError::InvalidEntryName { .. })
        ));
    }

    #[test]
    fn test_statement_tuple_kinds() {
        let entries = entries(&[
            ("a", EntrySchema::cryptographic()),
            ("b", EntrySchema::eddsa_pubkey()),
        ]);
        let scope = Scope::Pod(&entries);

        let literal = Statement::one_of("a", [PodValue::string("5")]);
        assert_eq!(
            audit_statement("s", &literal, scope).unwrap_err(),
            SpecAuditError::TupleKindMismatch {
                statement: "s".into(),
                index: 0,
                position: 0,
                expected: PodValueType::Cryptographic,
                actual: PodValueType::String,
            }
        );

        let target = Statement::one_of("a", [EntryRef::entry("$signerPublicKey")]);
        assert!(matches!(
            audit_statement("s", &target, scope),
            Err(SpecAuditError::TupleKindMismatch { .. })
        ));

        let same_kind = Statement::one_of("b", [EntryRef::entry("$signerPublicKey")]);
        assert!(audit_statement("s", &same_kind, scope).is_ok());
    }

    #[test]
    fn test_membership_constraint_kind() {
        let schema = EntrySchema::int().is_member_of([PodValue::int(1), PodValue::string("2")]);
        assert_eq!(
            audit_entry("a", &schema).unwrap_err(),
            SpecAuditError::MemberKindMismatch {
                entry: "a".into(),
                expected: PodValueType::Int,
                actual: PodValueType::String,
            }
        );
    }
}
