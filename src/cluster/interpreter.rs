//! Cluster effect interpreter using kube.
//!
//! Implements the effect traits against the Kubernetes API:
//! - Restarts are merge patches of the pod template annotations
//! - Parent declarations are read from deployment annotations
//! - ReplicaSet ownership is read from owner references
//!
//! Every API call is retried on transient errors with [`Backoff::API`].

use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use kube::api::{ListParams, Patch, PatchParams};
use serde_json::{Value, json};
use tracing::debug;

use crate::effects::{
    PARENT_ANNOTATION, ReplicaSetOwners, RestartCommand, RestartExecutor, TopologySource,
};
use crate::state::ParentDeclarations;
use crate::types::DeploymentName;

use super::client::ClusterClient;
use super::error::ClusterApiError;
use super::retry::{Backoff, with_backoff};

// ─── Interpreter Implementations ──────────────────────────────────────────────

impl RestartExecutor for ClusterClient {
    type Error = ClusterApiError;

    async fn execute(&self, command: RestartCommand) -> Result<(), Self::Error> {
        restart_deployment(self, &command, Backoff::API).await
    }
}

impl TopologySource for ClusterClient {
    type Error = ClusterApiError;

    async fn parent_declarations(&self) -> Result<ParentDeclarations, Self::Error> {
        let deployments = with_backoff(Backoff::API, || list_deployments(self)).await?;

        Ok(parent_declarations_of(&deployments))
    }
}

impl ReplicaSetOwners for ClusterClient {
    type Error = ClusterApiError;

    async fn deployment_owner(
        &self,
        replica_set: &str,
    ) -> Result<Option<DeploymentName>, Self::Error> {
        let rs = with_backoff(Backoff::API, || get_replica_set(self, replica_set)).await?;

        Ok(deployment_owner_of(&rs))
    }
}

// ─── Restart ──────────────────────────────────────────────────────────────────

/// Applies a restart command, retrying transient failures.
pub async fn restart_deployment(
    client: &ClusterClient,
    command: &RestartCommand,
    backoff: Backoff,
) -> Result<(), ClusterApiError> {
    let body = patch_body(command);
    with_backoff(backoff, || {
        patch_deployment(client, command.deployment.as_str(), &body)
    })
    .await
}

/// Builds the merge patch that stamps a restart onto a deployment's pod
/// template.
pub fn patch_body(command: &RestartCommand) -> Value {
    json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": command.annotations()
                }
            }
        }
    })
}

async fn patch_deployment(
    client: &ClusterClient,
    name: &str,
    body: &Value,
) -> Result<(), ClusterApiError> {
    debug!(deployment = name, namespace = client.namespace(), "Patching deployment");
    client
        .deployments()
        .patch(name, &PatchParams::default(), &Patch::Merge(body))
        .await
        .map(|_| ())
        .map_err(|e| ClusterApiError::from_kube(format!("patching deployment {name}"), e))
}

// ─── Topology ─────────────────────────────────────────────────────────────────

async fn list_deployments(client: &ClusterClient) -> Result<Vec<Deployment>, ClusterApiError> {
    client
        .deployments()
        .list(&ListParams::default())
        .await
        .map(|list| list.items)
        .map_err(|e| ClusterApiError::from_kube("listing deployments", e))
}

/// Reads the parent annotation of each deployment.
///
/// Deployments without a name are skipped. A missing or blank annotation means
/// the deployment has no parent.
pub fn parent_declarations_of(deployments: &[Deployment]) -> ParentDeclarations {
    deployments
        .iter()
        .filter_map(|deployment| {
            let name = deployment.metadata.name.as_deref()?;
            let parent = deployment
                .metadata
                .annotations
                .as_ref()
                .and_then(|annotations| annotations.get(PARENT_ANNOTATION))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(DeploymentName::from);
            Some((DeploymentName::from(name), parent))
        })
        .collect()
}

// ─── ReplicaSet Ownership ─────────────────────────────────────────────────────

async fn get_replica_set(
    client: &ClusterClient,
    name: &str,
) -> Result<ReplicaSet, ClusterApiError> {
    client
        .replica_sets()
        .get(name)
        .await
        .map_err(|e| ClusterApiError::from_kube(format!("reading replicaset {name}"), e))
}

/// Returns the deployment listed among a ReplicaSet's owner references.
pub fn deployment_owner_of(rs: &ReplicaSet) -> Option<DeploymentName> {
    rs.metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|owner| owner.kind == "Deployment")
        .map(|owner| DeploymentName::new(owner.name.clone()))
}
