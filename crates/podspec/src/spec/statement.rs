//! Named relational statements over entries.
//!
//! Statements form a closed set: every dispatch site matches on
//! [`Statement`] exhaustively, so a new kind is a compile-time break
//! wherever statements are audited, evaluated or serialized.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::PodValue;

/// A reference to an entry, optionally qualified by a pod label.
///
/// Written `owner` inside a single-pod spec and `ticket.owner` inside a
/// group spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryRef {
    pod: Option<String>,
    entry: String,
}

impl EntryRef {
    /// An unqualified reference to `entry`.
    pub fn entry(entry: impl Into<String>) -> Self {
        Self {
            pod: None,
            entry: entry.into(),
        }
    }

    /// A reference to `entry` inside the pod labelled `pod`.
    pub fn qualified(pod: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            pod: Some(pod.into()),
            entry: entry.into(),
        }
    }

    /// Parses `label.entry` or `entry`.
    pub fn parse(s: &str) -> Self {
        match s.split_once('.') {
            Some((pod, entry)) => Self::qualified(pod, entry),
            None => Self::entry(s),
        }
    }

    pub fn pod(&self) -> Option<&str> {
        self.pod.as_deref()
    }

    pub fn entry_name(&self) -> &str {
        &self.entry
    }

    /// Qualifies an unqualified reference with `label`; qualified references
    /// are returned unchanged.
    pub fn in_pod(&self, label: &str) -> EntryRef {
        match &self.pod {
            Some(_) => self.clone(),
            None => EntryRef::qualified(label, self.entry.clone()),
        }
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pod {
            Some(pod) => write!(f, "{}.{}", pod, self.entry),
            None => f.write_str(&self.entry),
        }
    }
}

impl From<&str> for EntryRef {
    fn from(s: &str) -> Self {
        EntryRef::parse(s)
    }
}

impl From<String> for EntryRef {
    fn from(s: String) -> Self {
        EntryRef::parse(&s)
    }
}

impl Serialize for EntryRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntryRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EntryRef::parse(&s))
    }
}

/// One element of a candidate tuple: a literal or another entry's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MembershipTarget {
    Value(PodValue),
    Entry(EntryRef),
}

impl From<PodValue> for MembershipTarget {
    fn from(value: PodValue) -> Self {
        MembershipTarget::Value(value)
    }
}

impl From<EntryRef> for MembershipTarget {
    fn from(entry: EntryRef) -> Self {
        MembershipTarget::Entry(entry)
    }
}

/// Payload shared by the membership statements.
///
/// The value tuple formed by `entries` is compared against each of `tuples`;
/// every tuple must have one element per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub entries: Vec<EntryRef>,
    pub tuples: Vec<Vec<MembershipTarget>>,
}

/// The recognized statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    IsMemberOf,
    IsNotMemberOf,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::IsMemberOf => "isMemberOf",
            StatementKind::IsNotMemberOf => "isNotMemberOf",
        }
    }

    pub fn parse(s: &str) -> Option<StatementKind> {
        match s {
            "isMemberOf" => Some(StatementKind::IsMemberOf),
            "isNotMemberOf" => Some(StatementKind::IsNotMemberOf),
            _ => None,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named constraint relating entries to a set of candidate tuples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RawStatement")]
pub enum Statement {
    /// The entries' values must equal at least one candidate tuple.
    IsMemberOf(Membership),
    /// The entries' values must equal none of the candidate tuples.
    IsNotMemberOf(Membership),
}

impl Statement {
    /// Builds an `isMemberOf` statement over a tuple of entries.
    pub fn is_member_of<E, R, T>(entries: E, tuples: T) -> Self
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        Statement::IsMemberOf(membership(entries, tuples))
    }

    /// Builds an `isNotMemberOf` statement over a tuple of entries.
    pub fn is_not_member_of<E, R, T>(entries: E, tuples: T) -> Self
    where
        E: IntoIterator<Item = R>,
        R: Into<EntryRef>,
        T: IntoIterator<Item = Vec<MembershipTarget>>,
    {
        Statement::IsNotMemberOf(membership(entries, tuples))
    }

    /// Single-entry `isMemberOf`: `entry` must equal one of `candidates`.
    pub fn one_of<C>(entry: impl Into<EntryRef>, candidates: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<MembershipTarget>,
    {
        Statement::IsMemberOf(single(entry, candidates))
    }

    /// Single-entry `isNotMemberOf`: `entry` must equal none of `candidates`.
    pub fn none_of<C>(entry: impl Into<EntryRef>, candidates: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<MembershipTarget>,
    {
        Statement::IsNotMemberOf(single(entry, candidates))
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::IsMemberOf(_) => StatementKind::IsMemberOf,
            Statement::IsNotMemberOf(_) => StatementKind::IsNotMemberOf,
        }
    }

    pub fn membership(&self) -> &Membership {
        match self {
            Statement::IsMemberOf(m) | Statement::IsNotMemberOf(m) => m,
        }
    }

    /// Every entry reference the statement depends on, including those
    /// inside candidate tuples.
    pub fn references(&self) -> impl Iterator<Item = &EntryRef> {
        let m = self.membership();
        m.entries.iter().chain(m.tuples.iter().flatten().filter_map(|t| match t {
            MembershipTarget::Entry(r) => Some(r),
            MembershipTarget::Value(_) => None,
        }))
    }

    /// Derived name used when a statement is added without one, e.g.
    /// `ticket_owner_isMemberOf`.
    pub fn default_name(&self) -> String {
        let mut name = String::new();
        for entry in &self.membership().entries {
            name.push_str(&entry.to_string().replace('.', "_"));
            name.push('_');
        }
        name.push_str(self.kind().as_str());
        name
    }

    /// Returns a copy with every unqualified reference qualified by `label`.
    pub fn in_pod(&self, label: &str) -> Statement {
        let m = self.membership();
        let qualified = Membership {
            entries: m.entries.iter().map(|r| r.in_pod(label)).collect(),
            tuples: m
                .tuples
                .iter()
                .map(|tuple| {
                    tuple
                        .iter()
                        .map(|t| match t {
                            MembershipTarget::Entry(r) => MembershipTarget::Entry(r.in_pod(label)),
                            MembershipTarget::Value(v) => MembershipTarget::Value(v.clone()),
                        })
                        .collect()
                })
                .collect(),
        };
        match self {
            Statement::IsMemberOf(_) => Statement::IsMemberOf(qualified),
            Statement::IsNotMemberOf(_) => Statement::IsNotMemberOf(qualified),
        }
    }
}

fn membership<E, R, T>(entries: E, tuples: T) -> Membership
where
    E: IntoIterator<Item = R>,
    R: Into<EntryRef>,
    T: IntoIterator<Item = Vec<MembershipTarget>>,
{
    Membership {
        entries: entries.into_iter().map(Into::into).collect(),
        tuples: tuples.into_iter().collect(),
    }
}

fn single<C>(entry: impl Into<EntryRef>, candidates: C) -> Membership
where
    C: IntoIterator,
    C::Item: Into<MembershipTarget>,
{
    Membership {
        entries: vec![entry.into()],
        tuples: candidates.into_iter().map(|c| vec![c.into()]).collect(),
    }
}

/// Plain-data form of a statement.
///
/// The type is kept as a string so unrecognized kinds reach the audit step
/// instead of failing inside the deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RawStatement {
    #[serde(rename = "type")]
    pub kind: String,
    pub entries: Vec<EntryRef>,
    #[serde(default)]
    pub tuples: Vec<Vec<MembershipTarget>>,
}

impl From<Statement> for RawStatement {
    fn from(statement: Statement) -> Self {
        let kind = statement.kind().as_str().to_string();
        let (Statement::IsMemberOf(m) | Statement::IsNotMemberOf(m)) = statement;
        RawStatement {
            kind,
            entries: m.entries,
            tuples: m.tuples,
        }
    }
}

impl RawStatement {
    /// Converts to a typed statement, or returns the unrecognized kind.
    pub(crate) fn into_statement(self) -> Result<Statement, String> {
        let membership = Membership {
            entries: self.entries,
            tuples: self.tuples,
        };
        match StatementKind::parse(&self.kind) {
            Some(StatementKind::IsMemberOf) => Ok(Statement::IsMemberOf(membership)),
            Some(StatementKind::IsNotMemberOf) => Ok(Statement::IsNotMemberOf(membership)),
            None => Err(self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ref_parse() {
        let r = EntryRef::parse("ticket.owner");
        assert_eq!(r.pod(), Some("ticket"));
        assert_eq!(r.entry_name(), "owner");
        assert_eq!(r.to_string(), "ticket.owner");

        let r = EntryRef::parse("$signerPublicKey");
        assert_eq!(r.pod(), None);
        assert_eq!(r.in_pod("b").to_string(), "b.$signerPublicKey");
    }

    #[test]
    fn test_default_name() {
        let st = Statement::one_of("a", [PodValue::string("x")]);
        assert_eq!(st.default_name(), "a_isMemberOf");

        let st = Statement::is_not_member_of(
            ["ticket.owner", "ticket.event"],
            Vec::<Vec<MembershipTarget>>::new(),
        );
        assert_eq!(st.default_name(), "ticket_owner_ticket_event_isNotMemberOf");
    }

    #[test]
    fn test_references_include_targets() {
        let st = Statement::one_of("A.owner", [EntryRef::parse("B.$signerPublicKey")]);
        let refs: Vec<String> = st.references().map(|r| r.to_string()).collect();
        assert_eq!(refs, vec!["A.owner", "B.$signerPublicKey"]);
    }

    #[test]
    fn test_in_pod_qualifies_references() {
        let st = Statement::one_of("a", [MembershipTarget::Entry(EntryRef::entry("b"))]);
        let q = st.in_pod("p");
        assert_eq!(q.membership().entries, vec![EntryRef::qualified("p", "a")]);
        assert_eq!(
            q.membership().tuples,
            vec![vec![MembershipTarget::Entry(EntryRef::qualified("p", "b"))]]
        );
    }

    #[test]
    fn test_statement_json_roundtrip_through_raw() {
        let st = Statement::one_of("a", [PodValue::int(1)]);
        let json = serde_json::to_value(&st).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "isMemberOf",
                "entries": ["a"],
                "tuples": [[{"type": "int", "value": 1}]]
            })
        );
        let raw: RawStatement = serde_json::from_value(json).unwrap();
        assert_eq!(raw.into_statement().unwrap(), st);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let raw: RawStatement = serde_json::from_value(serde_json::json!({
            "type": "isGreaterThan",
            "entries": ["a"]
        }))
        .unwrap();
        assert_eq!(raw.into_statement().unwrap_err(), "isGreaterThan");
    }
}
