//! Filtering record collections by specification.

use std::collections::BTreeMap;
use std::iter::FusedIterator;

use tracing::debug;

use crate::model::Pod;
use crate::spec::{PodGroupSpec, PodSpec};
use crate::validate::{validate_pod, validate_pod_with_options, ValidateOptions};

/// Lazy iterator over the records of a collection that satisfy a spec.
///
/// Yields references into the input in their original order; nothing is
/// validated until the iterator is advanced.
#[derive(Debug, Clone)]
pub struct Query<'a, I> {
    spec: &'a PodSpec,
    pods: I,
    options: ValidateOptions,
}

impl<'a, I> Iterator for Query<'a, I>
where
    I: Iterator<Item = &'a Pod>,
{
    type Item = &'a Pod;

    fn next(&mut self) -> Option<&'a Pod> {
        let spec = self.spec;
        let options = self.options;
        self.pods
            .find(|pod| validate_pod_with_options(spec, pod, &options).is_success())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pods.size_hint().1)
    }
}

impl<'a, I> FusedIterator for Query<'a, I> where I: FusedIterator<Item = &'a Pod> {}

/// Filters `pods` down to those that validate against `spec`.
pub fn query<'a, I>(spec: &'a PodSpec, pods: I) -> Query<'a, I::IntoIter>
where
    I: IntoIterator<Item = &'a Pod>,
{
    query_with_options(spec, pods, ValidateOptions::default())
}

pub fn query_with_options<'a, I>(
    spec: &'a PodSpec,
    pods: I,
    options: ValidateOptions,
) -> Query<'a, I::IntoIter>
where
    I: IntoIterator<Item = &'a Pod>,
{
    Query {
        spec,
        pods: pods.into_iter(),
        options,
    }
}

/// Filters `pods` once per group member.
///
/// Returns, for every label of `group`, the records that satisfy that
/// member's spec on its own. Cross-pod statements are not considered since
/// they only apply to a concrete assignment of records to labels.
pub fn query_group<'a, I>(group: &PodGroupSpec, pods: I) -> BTreeMap<String, Vec<&'a Pod>>
where
    I: IntoIterator<Item = &'a Pod>,
{
    let pods: Vec<&'a Pod> = pods.into_iter().collect();
    let matches: BTreeMap<String, Vec<&'a Pod>> = group
        .pods()
        .iter()
        .map(|(label, spec)| {
            let accepted = pods
                .iter()
                .copied()
                .filter(|pod| validate_pod(spec, pod).is_success())
                .collect();
            (label.clone(), accepted)
        })
        .collect();
    debug!(
        candidates = pods.len(),
        labels = matches.len(),
        "queried group"
    );
    matches
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::model::{PodBuilder, PodValue};
    use crate::spec::{build_group, build_spec, EntrySchema, Statement};

    fn key(n: u8) -> String {
        format!("{:02x}", n).repeat(32)
    }

    fn ticket(event: &str, seat: i64, n: u8) -> Pod {
        PodBuilder::new()
            .string("event", event)
            .int("seat", seat)
            .build(format!("sig-{n}"), key(n))
            .unwrap()
    }

    fn devcon_spec() -> PodSpec {
        build_spec()
            .entry("event", EntrySchema::string())
            .unwrap()
            .entry("seat", EntrySchema::int().in_range(1i64, 100i64))
            .unwrap()
            .statement("devcon_only", Statement::one_of("event", [PodValue::string("devcon")]))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_query_preserves_order() {
        let pods = vec![
            ticket("devcon", 5, 1),
            ticket("ethcc", 5, 2),
            ticket("devcon", 500, 3),
            ticket("devcon", 7, 4),
        ];
        let spec = devcon_spec();
        let found: Vec<&str> = spec.query(&pods).map(|p| p.signature()).collect();
        assert_eq!(found, vec!["sig-1", "sig-4"]);
    }

    #[test]
    fn test_query_empty_input() {
        let spec = devcon_spec();
        assert_eq!(query(&spec, Vec::<&Pod>::new()).count(), 0);
    }

    #[test]
    fn test_query_is_lazy() {
        let pods = vec![ticket("devcon", 5, 1), ticket("devcon", 6, 2)];
        let spec = devcon_spec();
        let mut q = spec.query(&pods);
        assert_eq!(q.next().map(Pod::signature), Some("sig-1"));
        assert_eq!(q.next().map(Pod::signature), Some("sig-2"));
        assert!(q.next().is_none());
    }

    #[test]
    fn test_query_strict_options() {
        let spec = build_spec()
            .entry("event", EntrySchema::string())
            .unwrap()
            .build()
            .unwrap();
        let pods = vec![
            PodBuilder::new().string("event", "a").build("s1", key(1)).unwrap(),
            ticket("b", 1, 2),
        ];
        assert_eq!(query(&spec, &pods).count(), 2);
        assert_eq!(query_with_options(&spec, &pods, ValidateOptions::strict()).count(), 1);
    }

    #[test]
    fn test_query_group_per_label() {
        let seats = build_spec()
            .entry("seat", EntrySchema::int())
            .unwrap()
            .build()
            .unwrap();
        let group = build_group()
            .pod("ticket", devcon_spec())
            .unwrap()
            .pod("any", seats)
            .unwrap()
            .build()
            .unwrap();
        let pods = vec![ticket("devcon", 5, 1), ticket("ethcc", 5, 2)];

        let result = query_group(&group, &pods);
        assert_eq!(result["ticket"].len(), 1);
        assert_eq!(result["any"].len(), 2);
    }

    proptest! {
        #[test]
        fn prop_query_is_idempotent(seats in proptest::collection::vec((any::<bool>(), -10i64..200), 0..20)) {
            let pods: Vec<Pod> = seats
                .iter()
                .enumerate()
                .map(|(i, (devcon, seat))| {
                    ticket(if *devcon { "devcon" } else { "ethcc" }, *seat, (i % 250) as u8 + 1)
                })
                .collect();
            let spec = devcon_spec();

            let once: Vec<&Pod> = spec.query(&pods).collect();
            let twice: Vec<&Pod> = spec.query(once.iter().copied()).collect();
            prop_assert_eq!(&once, &twice);

            let expected = seats
                .iter()
                .filter(|(devcon, seat)| *devcon && (1..=100).contains(seat))
                .count();
            prop_assert_eq!(once.len(), expected);
        }
    }
}
