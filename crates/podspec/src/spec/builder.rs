//! Builder API for specifications.
//!
//! Every builder method takes `&self` and returns a new builder, so a handle
//! kept from an earlier step still observes the earlier shape. Statements are
//! audited when they are added: every entry they reference must already be
//! declared (or be a virtual entry). `build` audits the whole spec again.
//!
//! # Example
//!
//! ```rust
//! use podspec::spec::{EntrySchema, PodSpecBuilder, Statement};
//! use podspec::PodValue;
//!
//! let spec = PodSpecBuilder::new()
//!     .entry("event", EntrySchema::string())?
//!     .entry("seat", EntrySchema::int().in_range(1i64, 500i64))?
//!     .is_member_of(["event"], vec![
//!         vec![PodValue::string("devcon").into()],
//!         vec![PodValue::string("zuconnect").into()],
//!     ])?
//!     .build()?;
//!
//! assert!(spec.statement("event_isMemberOf").is_some());
//! # Ok::<(), podspec::BuildError>(())
//! ```

use std::collections::BTreeMap;

use crate::error::{BuildError, Namespace};
use crate::limits::GPC_VERSION;
use crate::spec::audit::{audit_entry, audit_label, audit_statement, logged, Scope};
use crate::spec::{EntryRef, EntrySchema, MembershipTarget, PodGroupSpec, PodSpec, Statement};

/// Starts a single-pod specification.
pub fn build_spec() -> PodSpecBuilder {
    PodSpecBuilder::new()
}

/// Starts a group specification.
pub fn build_group() -> PodGroupSpecBuilder {
    PodGroupSpecBuilder::new()
}

/// Incremental builder for a [`PodSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSpecBuilder {
    entries: BTreeMap<String, EntrySchema>,
    statements: BTreeMap<String, Statement>,
}

impl PodSpecBuilder {
    /// Creates a new empty PodSpecBuilder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an entry.
    ///
    /// Fails with [`BuildError::DuplicateName`] if `name` is already declared,
    /// or with an audit error if the name or schema is malformed.
    pub fn entry(&self, name: impl Into<String>, schema: EntrySchema) -> Result<Self, BuildError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(BuildError::DuplicateName {
                namespace: Namespace::Entry,
                name,
            });
        }
        logged(audit_entry(&name, &schema))?;

        let mut next = self.clone();
        next.entries.insert(name, schema);
        Ok(next)
    }

    /// Adds a named statement over already-declared entries.
    pub fn statement(
        &self,
        name: impl Into<String>,
        statement: Statement,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        if self.statements.contains_key(&name) {
            return Err(BuildError::DuplicateName {
                namespace: Namespace::Statement,
                name,
            });
        }
        logged(audit_statement(&name, &statement, Scope::Pod(&self.entries)))?;

        let mut next = self.clone();
        next.statements.insert(name, statement);
        Ok(next)
    }

    /// Adds an `isMemberOf` statement named after its entries.
    pub fn is_member_of<E, R, T>(&self, entries: E, tuples: T) -> Result<Self, BuildError>
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        let statement = Statement::is_member_of(entries, tuples);
        self.statement(statement.default_name(), statement)
    }

    /// Adds an `isNotMemberOf` statement named after its entries.
    pub fn is_not_member_of<E, R, T>(&self, entries: E, tuples: T) -> Result<Self, BuildError>
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        let statement = Statement::is_not_member_of(entries, tuples);
        self.statement(statement.default_name(), statement)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn statement_names(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(String::as_str)
    }

    /// Audits and returns the finished specification.
    pub fn build(&self) -> Result<PodSpec, BuildError> {
        Ok(PodSpec::from_parts(
            self.entries.clone(),
            self.statements.clone(),
        )?)
    }
}

/// Incremental builder for a [`PodGroupSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodGroupSpecBuilder {
    pods: BTreeMap<String, PodSpec>,
    statements: BTreeMap<String, Statement>,
    gpc_version: u32,
}

impl Default for PodGroupSpecBuilder {
    fn default() -> Self {
        Self {
            pods: BTreeMap::new(),
            statements: BTreeMap::new(),
            gpc_version: GPC_VERSION,
        }
    }
}

impl PodGroupSpecBuilder {
    /// Creates a new empty group builder targeting [`GPC_VERSION`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the protocol version stamped on the group.
    pub fn gpc_version(&self, version: u32) -> Self {
        let mut next = self.clone();
        next.gpc_version = version;
        next
    }

    /// Adds a finished spec under `label`.
    pub fn pod(&self, label: impl Into<String>, spec: PodSpec) -> Result<Self, BuildError> {
        let label = label.into();
        if self.pods.contains_key(&label) {
            return Err(BuildError::DuplicateName {
                namespace: Namespace::Pod,
                name: label,
            });
        }
        logged(audit_label(&label))?;

        let mut next = self.clone();
        next.pods.insert(label, spec);
        Ok(next)
    }

    /// Adds a named cross-pod statement; references must be `label.entry`.
    pub fn statement(
        &self,
        name: impl Into<String>,
        statement: Statement,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        if self.statements.contains_key(&name) {
            return Err(BuildError::DuplicateName {
                namespace: Namespace::Statement,
                name,
            });
        }
        logged(audit_statement(&name, &statement, Scope::Group(&self.pods)))?;

        let mut next = self.clone();
        next.statements.insert(name, statement);
        Ok(next)
    }

    /// Adds an `isMemberOf` statement named after its entries.
    pub fn is_member_of<E, R, T>(&self, entries: E, tuples: T) -> Result<Self, BuildError>
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        let statement = Statement::is_member_of(entries, tuples);
        self.statement(statement.default_name(), statement)
    }

    /// Adds an `isNotMemberOf` statement named after its entries.
    pub fn is_not_member_of<E, R, T>(&self, entries: E, tuples: T) -> Result<Self, BuildError>
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        let statement = Statement::is_not_member_of(entries, tuples);
        self.statement(statement.default_name(), statement)
    }

    /// Audits and returns the finished group specification.
    pub fn build(&self) -> Result<PodGroupSpec, BuildError> {
        Ok(PodGroupSpec::from_parts(
            self.pods.clone(),
            self.statements.clone(),
            self.gpc_version,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecAuditError;
    use crate::model::PodValue;

    #[test]
    fn test_spec_builder_basic() {
        let spec = build_spec()
            .entry("a", EntrySchema::string())
            .unwrap()
            .entry("b", EntrySchema::int().optional())
            .unwrap()
            .statement("a_allowed", Statement::one_of("a", [PodValue::string("x")]))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(spec.entries().len(), 2);
        assert!(spec.entry("b").unwrap().is_optional());
        assert_eq!(spec.statements().len(), 1);
    }

    #[test]
    fn test_duplicate_entry_name() {
        let first = build_spec().entry("a", EntrySchema::string()).unwrap();
        let err = first.entry("a", EntrySchema::int()).unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateName {
                namespace: Namespace::Entry,
                name: "a".into(),
            }
        );

        let spec = first.build().unwrap();
        assert_eq!(spec.entry("a"), Some(&EntrySchema::string()));
    }

    #[test]
    fn test_duplicate_statement_name() {
        let builder = build_spec()
            .entry("a", EntrySchema::string())
            .unwrap()
            .is_member_of(["a"], vec![vec![PodValue::string("x").into()]])
            .unwrap();
        let err = builder
            .is_member_of(["a"], vec![vec![PodValue::string("y").into()]])
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::DuplicateName { namespace: Namespace::Statement, .. }
        ));
    }

    #[test]
    fn test_entry_and_statement_namespaces_are_separate() {
        let spec = build_spec()
            .entry("a", EntrySchema::string())
            .unwrap()
            .statement("a", Statement::one_of("a", [PodValue::string("x")]))
            .unwrap()
            .build();
        assert!(spec.is_ok());
    }

    #[test]
    fn test_earlier_handle_keeps_old_shape() {
        let one = build_spec().entry("a", EntrySchema::string()).unwrap();
        let two = one.entry("b", EntrySchema::int()).unwrap();

        assert_eq!(one.entry_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(two.entry_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(one.build().unwrap().entries().len(), 1);
    }

    #[test]
    fn test_statement_requires_declared_entries() {
        let builder = build_spec().entry("a", EntrySchema::string()).unwrap();
        let err = builder
            .statement("s", Statement::one_of("missingField", [PodValue::string("x")]))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::Audit(SpecAuditError::UnknownEntry {
                statement: "s".into(),
                entry: "missingField".into(),
            })
        );
        assert_eq!(builder.statement_names().count(), 0);
    }

    #[test]
    fn test_group_builder_cross_references() {
        let a = build_spec()
            .entry("owner", EntrySchema::eddsa_pubkey())
            .unwrap()
            .build()
            .unwrap();
        let b = build_spec().build().unwrap();

        let group = build_group()
            .pod("A", a.clone())
            .unwrap()
            .pod("B", b.clone())
            .unwrap()
            .is_member_of(["A.owner"], vec![vec![EntryRef::parse("B.$signerPublicKey").into()]])
            .unwrap()
            .build()
            .unwrap();
        assert!(group.statements().contains_key("A_owner_isMemberOf"));
        assert_eq!(group.gpc_version(), GPC_VERSION);

        let err = build_group()
            .pod("A", a.clone())
            .unwrap()
            .statement("s", Statement::one_of("A.missing", [PodValue::int(1)]))
            .unwrap_err();
        assert!(matches!(err, BuildError::Audit(SpecAuditError::UnknownEntry { .. })));

        let err = build_group()
            .pod("A", a.clone())
            .unwrap()
            .statement("s", Statement::one_of("owner", [PodValue::int(1)]))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Audit(SpecAuditError::UnqualifiedReferenceInGroup { .. })
        ));

        let err = build_group().pod("A", a.clone()).unwrap().pod("A", b).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateName { namespace: Namespace::Pod, .. }));

        let err = build_group().pod("not a label", a).unwrap_err();
        assert!(matches!(err, BuildError::Audit(SpecAuditError::InvalidPodLabel { .. })));
    }

    #[test]
    fn test_gpc_version_override() {
        let group = build_group().gpc_version(7).build().unwrap();
        assert_eq!(group.gpc_version(), 7);
    }
}
