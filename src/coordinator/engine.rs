//! Restart coordinator.
//!
//! The `RestartCoordinator` turns one observed pod restart into a cascade of
//! deployment restarts: it rebuilds the dependency tree, collects the
//! descendants of the restarted deployment, admits each one through the
//! cooldown ledger and hands admitted restarts to the executor.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::effects::{RestartCommand, RestartExecutor, TopologySource};
use crate::state::{
    CooldownEntry, CooldownLedger, DependencyTree, MalformedGraphError, collect_cascade,
};
use crate::types::{DeploymentName, RestartOutcome, TargetOutcome, TargetStatus, WaveId};

/// Errors that abort a whole restart cascade.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The parent declarations do not form a forest.
    #[error(transparent)]
    MalformedGraph(#[from] MalformedGraphError),

    /// The parent declarations could not be listed.
    #[error("failed to list parent declarations: {0}")]
    Topology(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read-only access to cooldown state, for diagnostics.
pub trait CooldownView: Send + Sync {
    /// Returns when the controller last restarted `deployment`, if ever.
    fn last_restart(&self, deployment: &DeploymentName) -> Option<DateTime<Utc>>;

    /// Returns every recorded restart, sorted by deployment name.
    fn cooldowns(&self) -> Vec<CooldownEntry>;
}

/// Coordinates restart cascades.
///
/// Owns the cooldown ledger. Safe to share behind an `Arc` and call
/// concurrently: cooldown admission is atomic per deployment, and each call
/// works on its own snapshot of the dependency tree.
#[derive(Debug)]
pub struct RestartCoordinator<S, E> {
    source: S,
    executor: E,
    ledger: CooldownLedger,
}

impl<S, E> RestartCoordinator<S, E>
where
    S: TopologySource + Sync,
    E: RestartExecutor + Sync,
{
    pub fn new(source: S, executor: E, ledger: CooldownLedger) -> Self {
        RestartCoordinator {
            source,
            executor,
            ledger,
        }
    }

    /// Restarts every descendant of `root` that is outside its cooldown window.
    ///
    /// `root` itself is never restarted. All restarts issued by one call share a
    /// freshly generated wave id and are stamped with `now`. Each descendant's
    /// reason names the parent through which the cascade reached it.
    ///
    /// A failed restart is recorded in the outcome, its cooldown admission is
    /// revoked, and the remaining descendants are still processed.
    ///
    /// # Errors
    ///
    /// - `Topology` if the parent declarations cannot be listed
    /// - `MalformedGraph` if they contain a cycle or an unknown parent; no
    ///   deployment is restarted in that case
    #[instrument(skip_all, fields(root = %root))]
    pub async fn on_pod_restart(
        &self,
        root: &DeploymentName,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RestartOutcome, CoordinatorError> {
        let declarations = self
            .source
            .parent_declarations()
            .await
            .map_err(|e| CoordinatorError::Topology(Box::new(e)))?;
        let tree = DependencyTree::build(&declarations)?;
        debug!(
            deployments = tree.len(),
            edges = tree.edge_count(),
            "Built dependency tree"
        );

        let wave_id = WaveId::generate();
        let targets = collect_cascade(&tree, [root]);

        if targets.is_empty() {
            info!(trigger = reason, "No dependents to restart");
        } else {
            info!(
                wave = %wave_id,
                trigger = reason,
                targets = targets.len(),
                "Starting restart cascade"
            );
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let target_reason = format!("parent {} changed", target.via);

            let status = match self.ledger.admit(&target.deployment, now) {
                None => {
                    info!(
                        deployment = %target.deployment,
                        "Skipping restart, deployment is in cooldown"
                    );
                    TargetStatus::CooldownActive
                }
                Some(admission) => {
                    let command = RestartCommand {
                        deployment: target.deployment.clone(),
                        wave_id,
                        reason: target_reason.clone(),
                        restarted_at: now,
                    };
                    match self.executor.execute(command).await {
                        Ok(()) => {
                            info!(
                                deployment = %target.deployment,
                                wave = %wave_id,
                                reason = %target_reason,
                                "Restarted deployment"
                            );
                            TargetStatus::Restarted
                        }
                        Err(e) => {
                            let error = e.to_string();
                            warn!(
                                deployment = %target.deployment,
                                wave = %wave_id,
                                error = %error,
                                "Failed to restart deployment"
                            );
                            self.ledger.revoke(admission);
                            TargetStatus::Failed { error }
                        }
                    }
                }
            };

            outcomes.push(TargetOutcome {
                deployment: target.deployment,
                reason: target_reason,
                status,
            });
        }

        Ok(RestartOutcome {
            root: root.clone(),
            trigger_reason: reason.to_string(),
            wave_id,
            started_at: now,
            targets: outcomes,
        })
    }
}

impl<S, E> CooldownView for RestartCoordinator<S, E>
where
    S: Send + Sync,
    E: Send + Sync,
{
    fn last_restart(&self, deployment: &DeploymentName) -> Option<DateTime<Utc>> {
        self.ledger.peek(deployment)
    }

    fn cooldowns(&self) -> Vec<CooldownEntry> {
        self.ledger.entries()
    }
}
