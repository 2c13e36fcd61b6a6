//! Statement evaluation over resolved entry values.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::model::name::VirtualEntry;
use crate::model::{Pod, PodValue};
use crate::spec::{EntryRef, MembershipTarget, Statement};
use crate::validate::{Issue, IssueCode};

/// Outcome of looking up an entry reference.
#[derive(Debug, Clone)]
pub(crate) enum Resolution<'a> {
    /// The entry has a value of the declared kind.
    Present(Cow<'a, PodValue>),
    /// An optional entry that the record does not carry.
    Absent,
    /// The entry already produced an issue, or its pod is missing.
    Invalid,
}

/// Resolved entry values for one validation call.
///
/// Declared entries are recorded after their schema check; virtual entries
/// are computed on first use and cached.
#[derive(Debug, Default)]
pub(crate) struct Resolver<'a> {
    entries: FxHashMap<EntryRef, Resolution<'a>>,
    pods: FxHashMap<Option<String>, &'a Pod>,
}

impl<'a> Resolver<'a> {
    pub fn add_pod(&mut self, label: Option<&str>, pod: &'a Pod) {
        self.pods.insert(label.map(str::to_string), pod);
    }

    pub fn record(&mut self, reference: EntryRef, resolution: Resolution<'a>) {
        self.entries.insert(reference, resolution);
    }

    pub fn resolve(&mut self, reference: &EntryRef) -> Resolution<'a> {
        if let Some(resolution) = self.entries.get(reference) {
            return resolution.clone();
        }

        let pod_key = reference.pod().map(str::to_string);
        let resolution = match (
            VirtualEntry::from_name(reference.entry_name()),
            self.pods.get(&pod_key),
        ) {
            (Some(entry), Some(pod)) => Resolution::Present(Cow::Owned(pod.virtual_value(entry))),
            _ => Resolution::Invalid,
        };
        self.entries.insert(reference.clone(), resolution.clone());
        resolution
    }
}

/// Evaluates `statement`, returning an issue if it fails.
///
/// Statements over entries that already failed their own checks (or whose
/// pod is missing) are skipped so each violation is reported once. A reference to an absent optional
/// entry is reported as a malformed reference.
pub(crate) fn evaluate(
    name: &str,
    statement: &Statement,
    path: Vec<String>,
    resolver: &mut Resolver<'_>,
) -> Option<Issue> {
    let membership = statement.membership();

    for reference in statement.references() {
        match resolver.resolve(reference) {
            Resolution::Present(_) => {}
            Resolution::Invalid => return None,
            Resolution::Absent => {
                return Some(Issue::new(
                    IssueCode::MalformedReference,
                    path,
                    format!("statement {name:?} references absent entry {reference}"),
                ));
            }
        }
    }

    let actual: Vec<Cow<'_, PodValue>> = membership
        .entries
        .iter()
        .filter_map(|reference| match resolver.resolve(reference) {
            Resolution::Present(value) => Some(value),
            Resolution::Absent | Resolution::Invalid => None,
        })
        .collect();

    let mut matched = false;
    for tuple in &membership.tuples {
        if tuple_matches(tuple, &actual, resolver) {
            matched = true;
            break;
        }
    }

    let rendered = render_tuple(&actual);
    match statement {
        Statement::IsMemberOf(_) => (!matched).then(|| {
            Issue::new(
                IssueCode::StatementFailed,
                path,
                format!(
                    "statement {name:?} failed: {rendered} is not a member of the {} candidate tuples",
                    membership.tuples.len()
                ),
            )
        }),
        Statement::IsNotMemberOf(_) => matched.then(|| {
            Issue::new(
                IssueCode::StatementFailed,
                path,
                format!("statement {name:?} failed: {rendered} is a member of the excluded tuples"),
            )
        }),
    }
}

/// Compares element-wise; values of different kinds never match, and a
/// target entry without a usable value matches nothing.
fn tuple_matches(
    tuple: &[MembershipTarget],
    actual: &[Cow<'_, PodValue>],
    resolver: &mut Resolver<'_>,
) -> bool {
    tuple.iter().zip(actual).all(|(target, value)| match target {
        MembershipTarget::Value(candidate) => candidate == value.as_ref(),
        MembershipTarget::Entry(reference) => match resolver.resolve(reference) {
            Resolution::Present(candidate) => candidate.as_ref() == value.as_ref(),
            Resolution::Absent | Resolution::Invalid => false,
        },
    })
}

fn render_tuple(values: &[Cow<'_, PodValue>]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    if parts.len() == 1 {
        parts.concat()
    } else {
        format!("({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PodBuilder;

    fn key(n: u8) -> String {
        format!("{:02x}", n).repeat(32)
    }

    #[test]
    fn test_virtual_entries_resolve_lazily() {
        let pod = PodBuilder::new().int("a", 1).build("sig", key(1)).unwrap();
        let mut resolver = Resolver::default();
        resolver.add_pod(None, &pod);

        match resolver.resolve(&EntryRef::entry("$signerPublicKey")) {
            Resolution::Present(v) => assert_eq!(v.into_owned(), PodValue::eddsa_pubkey(key(1))),
            other => panic!("unexpected resolution {other:?}"),
        }
        assert!(matches!(
            resolver.resolve(&EntryRef::qualified("missing", "$signature")),
            Resolution::Invalid
        ));
    }

    #[test]
    fn test_tuple_membership() {
        let pod = PodBuilder::new()
            .string("event", "devcon")
            .int("seat", 7)
            .build("sig", key(1))
            .unwrap();
        let mut resolver = Resolver::default();
        resolver.add_pod(None, &pod);
        for (name, value) in pod.entries() {
            resolver.record(EntryRef::entry(name.as_str()), Resolution::Present(Cow::Borrowed(value)));
        }

        let hit = Statement::is_member_of(
            ["event", "seat"],
            vec![
                vec![PodValue::string("devcon").into(), PodValue::int(8).into()],
                vec![PodValue::string("devcon").into(), PodValue::int(7).into()],
            ],
        );
        assert!(evaluate("s", &hit, vec![], &mut resolver).is_none());

        let miss = Statement::is_member_of(
            ["event", "seat"],
            vec![vec![PodValue::string("devcon").into(), PodValue::int(8).into()]],
        );
        let issue = evaluate("s", &miss, vec!["s".into()], &mut resolver).unwrap();
        assert_eq!(issue.code, IssueCode::StatementFailed);
        assert!(issue.message.contains("(\"devcon\", 7)"));
    }

    #[test]
    fn test_absent_and_invalid_references() {
        let pod = PodBuilder::new().build("sig", key(1)).unwrap();
        let mut resolver = Resolver::default();
        resolver.add_pod(None, &pod);
        resolver.record(EntryRef::entry("opt"), Resolution::Absent);
        resolver.record(EntryRef::entry("bad"), Resolution::Invalid);

        let st = Statement::one_of("opt", [PodValue::int(1)]);
        let issue = evaluate("s", &st, vec![], &mut resolver).unwrap();
        assert_eq!(issue.code, IssueCode::MalformedReference);

        let st = Statement::one_of("bad", [PodValue::int(1)]);
        assert!(evaluate("s", &st, vec![], &mut resolver).is_none());
    }
}
