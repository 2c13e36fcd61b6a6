//! Validates a JSON array of PODs against a JSON specification.
//!
//! Usage: cargo run --example query_file -- SPEC.json PODS.json

use std::fs;
use std::process::ExitCode;

use podspec::codec::decode_spec;
use podspec::Pod;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let (Some(spec_path), Some(pods_path)) = (args.next(), args.next()) else {
        eprintln!("usage: query_file SPEC.json PODS.json");
        return ExitCode::FAILURE;
    };

    let spec = match fs::read_to_string(&spec_path)
        .map_err(|e| e.to_string())
        .and_then(|json| decode_spec(&json).map_err(|e| e.to_string()))
    {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("failed to load spec {}: {}", spec_path, err);
            return ExitCode::FAILURE;
        }
    };

    let pods: Vec<Pod> = match fs::read_to_string(&pods_path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
    {
        Ok(pods) => pods,
        Err(err) => {
            eprintln!("failed to load pods {}: {}", pods_path, err);
            return ExitCode::FAILURE;
        }
    };

    println!("Spec: {} entries, {} statements", spec.entries().len(), spec.statements().len());
    println!("Pods: {}", pods.len());

    for pod in &pods {
        let result = spec.validate(pod);
        if result.is_success() {
            println!("\n[match] {}", pod.signature());
            continue;
        }
        println!("\n[reject] {}", pod.signature());
        for issue in result.issues() {
            println!("  {}", issue);
        }
    }

    println!("\n{} of {} pods match", spec.query(&pods).count(), pods.len());
    ExitCode::SUCCESS
}
