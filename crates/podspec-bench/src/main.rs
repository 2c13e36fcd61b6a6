//! Benchmark for podspec validation and queries over synthetic tickets.
//!
//! Generates a deterministic ticket collection, then times validation,
//! queries, group validation and the JSON codec.
//!
//! Usage: bench-tickets [COUNT]

use std::time::Instant;

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use podspec::codec::{decode_pod, encode_pod};
use podspec::spec::{build_group, build_spec, EntryRef, EntrySchema, Statement};
use podspec::{validate_group, Pod, PodBuilder, PodGroupSpec, PodSpec, PodValue};

const EVENTS: [&str; 4] = ["devcon", "ethcc", "zuconnect", "ethdenver"];
const SIGNERS: u64 = 16;

fn key(n: u64) -> String {
    format!("{:064x}", n + 1)
}

fn generate_tickets(count: usize) -> Vec<Pod> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| {
            let event = EVENTS[rng.gen_range(0..EVENTS.len())];
            let seat: i64 = rng.gen_range(0..600);
            let commitment = BigUint::from(rng.r#gen::<u64>()) * BigUint::from(rng.r#gen::<u64>());
            PodBuilder::new()
                .string("event", event)
                .int("seat", seat)
                .cryptographic("commitment", commitment)
                .eddsa_pubkey("owner", key(rng.gen_range(0..SIGNERS)))
                .build(format!("sig-{i}"), key(rng.gen_range(0..SIGNERS)))
                .expect("generated ticket is well-formed")
        })
        .collect()
}

fn ticket_spec() -> PodSpec {
    build_spec()
        .entry("event", EntrySchema::string())
        .and_then(|b| b.entry("seat", EntrySchema::int().in_range(1i64, 500i64)))
        .and_then(|b| b.entry("commitment", EntrySchema::cryptographic()))
        .and_then(|b| b.entry("owner", EntrySchema::eddsa_pubkey()))
        .and_then(|b| {
            b.statement(
                "conference",
                Statement::one_of(
                    "event",
                    [PodValue::string("devcon"), PodValue::string("zuconnect")],
                ),
            )
        })
        .and_then(|b| b.build())
        .expect("ticket spec is well-formed")
}

fn ownership_group(ticket: PodSpec) -> PodGroupSpec {
    build_group()
        .pod("ticket", ticket)
        .and_then(|b| b.pod("identity", build_spec().build()?))
        .and_then(|b| {
            b.statement(
                "owned",
                Statement::one_of("ticket.owner", [EntryRef::parse("identity.$signerPublicKey")]),
            )
        })
        .and_then(|b| b.build())
        .expect("group spec is well-formed")
}

fn main() {
    let count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000);

    println!("=== podspec ticket benchmark ===");

    let gen_start = Instant::now();
    let tickets = generate_tickets(count);
    println!("Generated {} tickets in {:?}", tickets.len(), gen_start.elapsed());

    let spec = ticket_spec();

    // Validation
    const VALIDATE_ITERS: u32 = 5;
    let mut accepted = 0;
    let validate_start = Instant::now();
    for _ in 0..VALIDATE_ITERS {
        accepted = tickets.iter().filter(|t| spec.validate(t).is_success()).count();
    }
    let validate_time = validate_start.elapsed() / VALIDATE_ITERS;
    println!(
        "\nValidate: {:?} (avg of {} iterations), {} accepted",
        validate_time, VALIDATE_ITERS, accepted
    );
    println!(
        "  Throughput: {:.0} pods/s",
        tickets.len() as f64 / validate_time.as_secs_f64()
    );

    let issues: usize = tickets.iter().map(|t| spec.validate(t).issues().len()).sum();
    println!("  Issues reported: {}", issues);

    // Query
    let query_start = Instant::now();
    let matched = spec.query(&tickets).count();
    let query_time = query_start.elapsed();
    println!("\nQuery: {} matches in {:?}", matched, query_time);
    assert_eq!(matched, accepted, "query must agree with validation");

    let first_start = Instant::now();
    let first = spec.query(&tickets).next();
    println!("  First match in {:?} (lazy)", first_start.elapsed());
    assert!(matched == 0 || first.is_some());

    // Group validation over every (ticket, identity) pairing with one identity per signer
    let group = ownership_group(spec.clone());
    let identities: Vec<Pod> = (0..SIGNERS)
        .map(|n| {
            PodBuilder::new()
                .build(format!("identity-{n}"), key(n))
                .expect("identity is well-formed")
        })
        .collect();
    let group_start = Instant::now();
    let mut owned = 0;
    for ticket in tickets.iter().take(10_000) {
        for identity in &identities {
            if validate_group(&group, [("ticket", ticket), ("identity", identity)]).is_success() {
                owned += 1;
            }
        }
    }
    println!(
        "\nGroup validation: {} owned pairings in {:?}",
        owned,
        group_start.elapsed()
    );

    // Codec
    let encode_start = Instant::now();
    let encoded: Vec<String> = tickets
        .iter()
        .map(|t| encode_pod(t).expect("encode"))
        .collect();
    let encode_time = encode_start.elapsed();
    let bytes: usize = encoded.iter().map(String::len).sum();
    println!("\nEncode: {} bytes in {:?}", bytes, encode_time);

    let decode_start = Instant::now();
    for (json, ticket) in encoded.iter().zip(&tickets) {
        let decoded = decode_pod(json).expect("decode");
        assert_eq!(&decoded, ticket);
    }
    println!("Decode: {:?}", decode_start.elapsed());

    let spec_json = serde_json::to_string_pretty(&spec).expect("spec serializes");
    println!("\n=== Spec ===\n{}", spec_json);
}
