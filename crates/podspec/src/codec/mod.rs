//! Plain-data (JSON) encoding for specifications, records and proof requests.
//!
//! Values are written as `{"type": ..., "value": ...}` with cryptographic
//! values as decimal strings, so every shape survives a structured-clone or
//! RPC boundary. Decoding re-runs the same checks as construction: decoded
//! specifications are audited and decoded records re-validated.

use tracing::warn;

use crate::error::CodecError;
use crate::model::pod::RawPod;
use crate::model::Pod;
use crate::proof::{ProofRequest, RawProofRequest};
use crate::spec::group::RawGroupSpec;
use crate::spec::pod_spec::RawPodSpec;
use crate::spec::{PodGroupSpec, PodSpec};

pub fn encode_spec(spec: &PodSpec) -> Result<String, CodecError> {
    Ok(serde_json::to_string(spec)?)
}

/// Decodes and audits a single-pod specification.
pub fn decode_spec(json: &str) -> Result<PodSpec, CodecError> {
    let raw: RawPodSpec = parse(json)?;
    Ok(PodSpec::try_from(raw)?)
}

pub fn encode_group(group: &PodGroupSpec) -> Result<String, CodecError> {
    Ok(serde_json::to_string(group)?)
}

/// Decodes and audits a group specification, members included.
pub fn decode_group(json: &str) -> Result<PodGroupSpec, CodecError> {
    let raw: RawGroupSpec = parse(json)?;
    Ok(PodGroupSpec::try_from(raw)?)
}

pub fn encode_pod(pod: &Pod) -> Result<String, CodecError> {
    Ok(serde_json::to_string(pod)?)
}

/// Decodes a record, re-checking names, values and signer key.
pub fn decode_pod(json: &str) -> Result<Pod, CodecError> {
    let raw: RawPod = parse(json)?;
    Ok(Pod::try_from(raw)?)
}

pub fn encode_proof_request(request: &ProofRequest) -> Result<String, CodecError> {
    Ok(serde_json::to_string(request)?)
}

/// Decodes a proof request, rebuilding it from its audited group.
///
/// Fails if the version or the membership lists differ from what the group
/// produces.
pub fn decode_proof_request(json: &str) -> Result<ProofRequest, CodecError> {
    let raw: RawProofRequest = parse(json)?;
    ProofRequest::try_from(raw)
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, CodecError> {
    serde_json::from_str(json).map_err(|err| {
        warn!(error = %err, "rejected malformed JSON");
        CodecError::from(err)
    })
}
