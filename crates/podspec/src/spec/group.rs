//! Group specifications: labelled member specs plus cross-pod statements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SpecAuditError;
use crate::limits::GPC_VERSION;
use crate::spec::audit::audit_group_parts;
use crate::spec::pod_spec::{convert_statements, RawPodSpec};
use crate::spec::statement::RawStatement;
use crate::spec::{PodGroupSpecBuilder, PodSpec, Statement};

/// A labelled collection of [`PodSpec`]s with statements that may reference
/// any member entry as `label.entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupSpec", rename_all = "camelCase")]
pub struct PodGroupSpec {
    pods: BTreeMap<String, PodSpec>,
    statements: BTreeMap<String, Statement>,
    gpc_version: u32,
}

impl PodGroupSpec {
    /// Starts an empty group builder.
    pub fn builder() -> PodGroupSpecBuilder {
        PodGroupSpecBuilder::new()
    }

    pub(crate) fn from_parts(
        pods: BTreeMap<String, PodSpec>,
        statements: BTreeMap<String, Statement>,
        gpc_version: u32,
    ) -> Result<PodGroupSpec, SpecAuditError> {
        audit_group_parts(&pods, &statements)?;
        Ok(PodGroupSpec {
            pods,
            statements,
            gpc_version,
        })
    }

    pub fn pods(&self) -> &BTreeMap<String, PodSpec> {
        &self.pods
    }

    pub fn pod(&self, label: &str) -> Option<&PodSpec> {
        self.pods.get(label)
    }

    pub fn statements(&self) -> &BTreeMap<String, Statement> {
        &self.statements
    }

    pub fn gpc_version(&self) -> u32 {
        self.gpc_version
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGroupSpec {
    pods: BTreeMap<String, RawPodSpec>,
    #[serde(default)]
    statements: BTreeMap<String, RawStatement>,
    #[serde(default = "default_gpc_version")]
    gpc_version: u32,
}

fn default_gpc_version() -> u32 {
    GPC_VERSION
}

impl TryFrom<RawGroupSpec> for PodGroupSpec {
    type Error = SpecAuditError;

    fn try_from(raw: RawGroupSpec) -> Result<Self, Self::Error> {
        let pods = raw
            .pods
            .into_iter()
            .map(|(label, spec)| Ok((label, PodSpec::try_from(spec)?)))
            .collect::<Result<BTreeMap<_, _>, SpecAuditError>>()?;
        PodGroupSpec::from_parts(pods, convert_statements(raw.statements)?, raw.gpc_version)
    }
}
