//! Proof request assembly.
//!
//! The engine never proves anything itself. A [`ProofRequest`] pairs an
//! audited group specification with the protocol version and the flattened
//! membership lists an external prover consumes; [`ProofSystem`] is the seam
//! where that prover plugs in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CodecError, ProofRequestError};
use crate::limits::GPC_VERSION;
use crate::model::{Pod, PodValue};
use crate::spec::group::RawGroupSpec;
use crate::spec::{MembershipTarget, PodGroupSpec, Statement};
use crate::validate::{validate_group, ValidGroup, ValidationResult};

/// Optional inputs carried alongside a proof request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequestOptions {
    /// Value bound into the proof to tie it to one request.
    pub watermark: Option<PodValue>,
    /// Scope for the nullifier the prover derives, if any.
    pub external_nullifier: Option<PodValue>,
}

/// A versioned request handed to an external proof system.
///
/// Only obtainable from [`build_proof_request`] or by decoding, which checks
/// that the version and membership lists are exactly what the embedded group
/// produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProofRequest", rename_all = "camelCase")]
pub struct ProofRequest {
    gpc_version: u32,
    pods: PodGroupSpec,
    membership_lists: BTreeMap<String, Vec<Vec<MembershipTarget>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermark: Option<PodValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_nullifier: Option<PodValue>,
}

impl ProofRequest {
    /// Protocol version the prover must implement.
    pub fn gpc_version(&self) -> u32 {
        self.gpc_version
    }

    /// The group specification to prove.
    pub fn pods(&self) -> &PodGroupSpec {
        &self.pods
    }

    /// Candidate tuples of every statement, keyed by statement name. Member
    /// statements are keyed `label.name` and their references qualified.
    pub fn membership_lists(&self) -> &BTreeMap<String, Vec<Vec<MembershipTarget>>> {
        &self.membership_lists
    }

    /// Value the prover binds into the proof, if any.
    pub fn watermark(&self) -> Option<&PodValue> {
        self.watermark.as_ref()
    }

    pub fn external_nullifier(&self) -> Option<&PodValue> {
        self.external_nullifier.as_ref()
    }

    /// Validates labelled records against the requested group.
    ///
    /// Proof systems expect callers to run this before proving.
    pub fn validate<'a, I, L>(&'a self, pods: I) -> ValidationResult<ValidGroup<'a>>
    where
        I: IntoIterator<Item = (L, &'a Pod)>,
        L: Into<String>,
    {
        validate_group(&self.pods, pods)
    }
}

/// Plain-data form read before the request is checked against its group.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProofRequest {
    gpc_version: u32,
    pods: RawGroupSpec,
    #[serde(default)]
    membership_lists: BTreeMap<String, Vec<Vec<MembershipTarget>>>,
    #[serde(default)]
    watermark: Option<PodValue>,
    #[serde(default)]
    external_nullifier: Option<PodValue>,
}

impl TryFrom<RawProofRequest> for ProofRequest {
    type Error = CodecError;

    fn try_from(raw: RawProofRequest) -> Result<Self, Self::Error> {
        let group = PodGroupSpec::try_from(raw.pods)?;
        if raw.gpc_version != group.gpc_version() {
            return Err(ProofRequestError::VersionMismatch {
                request: raw.gpc_version,
                group: group.gpc_version(),
            }
            .into());
        }

        let request = build_proof_request_with_options(
            &group,
            ProofRequestOptions {
                watermark: raw.watermark,
                external_nullifier: raw.external_nullifier,
            },
        );
        if request.membership_lists != raw.membership_lists {
            warn!("decoded proof request carries membership lists its group does not produce");
            return Err(ProofRequestError::MembershipListMismatch.into());
        }
        Ok(request)
    }
}

/// Wraps `group` in a proof request with no watermark or nullifier.
pub fn build_proof_request(group: &PodGroupSpec) -> ProofRequest {
    build_proof_request_with_options(group, ProofRequestOptions::default())
}

/// Wraps `group` in a proof request.
///
/// `group` is already audited, so this cannot fail. The request keeps the
/// group's own protocol version, which defaults to [`GPC_VERSION`].
pub fn build_proof_request_with_options(
    group: &PodGroupSpec,
    options: ProofRequestOptions,
) -> ProofRequest {
    let mut membership_lists = BTreeMap::new();
    for (label, spec) in group.pods() {
        for (name, statement) in spec.statements() {
            membership_lists.insert(
                format!("{label}.{name}"),
                tuples_of(&statement.in_pod(label)),
            );
        }
    }
    for (name, statement) in group.statements() {
        membership_lists.insert(name.clone(), tuples_of(statement));
    }

    if group.gpc_version() != GPC_VERSION {
        debug!(
            version = group.gpc_version(),
            default = GPC_VERSION,
            "proof request uses non-default gpc version"
        );
    }
    debug!(
        pods = group.pods().len(),
        lists = membership_lists.len(),
        "built proof request"
    );

    ProofRequest {
        gpc_version: group.gpc_version(),
        pods: group.clone(),
        membership_lists,
        watermark: options.watermark,
        external_nullifier: options.external_nullifier,
    }
}

fn tuples_of(statement: &Statement) -> Vec<Vec<MembershipTarget>> {
    statement.membership().tuples.clone()
}

/// External prover and verifier for [`ProofRequest`]s.
pub trait ProofSystem {
    type Proof;
    type Error: std::error::Error;

    /// Produces a proof that `pods` (keyed by label) satisfy `request`.
    fn prove(
        &self,
        request: &ProofRequest,
        pods: &BTreeMap<String, Pod>,
    ) -> Result<Self::Proof, Self::Error>;

    /// Checks `proof` against `request`.
    fn verify(&self, request: &ProofRequest, proof: &Self::Proof) -> Result<bool, Self::Error>;
}
