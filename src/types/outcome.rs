//! Result types for a single restart cascade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DeploymentName, WaveId};

/// What happened to one descendant during a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetStatus {
    /// The restart annotations were patched onto the deployment.
    Restarted,

    /// The deployment was restarted by the controller within the cooldown window.
    CooldownActive,

    /// The executor failed to patch the deployment.
    Failed { error: String },
}

/// The outcome for one descendant of the triggering root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub deployment: DeploymentName,

    /// The reason recorded (or that would have been recorded) on the deployment.
    pub reason: String,

    pub status: TargetStatus,
}

/// Summary of one restart episode.
///
/// Targets are listed in cascade order: a deployment always appears after the
/// deployment through which the cascade reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    /// The deployment whose pod restart triggered the cascade.
    pub root: DeploymentName,

    /// The reason reported by the event source for the root's restart.
    pub trigger_reason: String,

    /// Identifier shared by every restart in this cascade.
    pub wave_id: WaveId,

    /// Timestamp stamped on every patch issued in this cascade.
    pub started_at: DateTime<Utc>,

    pub targets: Vec<TargetOutcome>,
}

impl RestartOutcome {
    /// Returns the deployments that were restarted.
    pub fn restarted(&self) -> Vec<&DeploymentName> {
        self.with_status(|s| matches!(s, TargetStatus::Restarted))
    }

    /// Returns the deployments that were skipped because of the cooldown window.
    pub fn skipped(&self) -> Vec<&DeploymentName> {
        self.with_status(|s| matches!(s, TargetStatus::CooldownActive))
    }

    /// Returns the deployments whose patch failed, with the error text.
    pub fn failed(&self) -> Vec<(&DeploymentName, &str)> {
        self.targets
            .iter()
            .filter_map(|t| match &t.status {
                TargetStatus::Failed { error } => Some((&t.deployment, error.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Returns the outcome for a specific deployment, if it was a target.
    pub fn target(&self, deployment: &DeploymentName) -> Option<&TargetOutcome> {
        self.targets.iter().find(|t| &t.deployment == deployment)
    }

    /// Returns true if the root had no descendants.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns true if at least one patch failed.
    pub fn has_failures(&self) -> bool {
        self.targets
            .iter()
            .any(|t| matches!(t.status, TargetStatus::Failed { .. }))
    }

    fn with_status(&self, pred: impl Fn(&TargetStatus) -> bool) -> Vec<&DeploymentName> {
        self.targets
            .iter()
            .filter(|t| pred(&t.status))
            .map(|t| &t.deployment)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, status: TargetStatus) -> TargetOutcome {
        TargetOutcome {
            deployment: DeploymentName::from(name),
            reason: "parent db changed".to_string(),
            status,
        }
    }

    fn outcome(targets: Vec<TargetOutcome>) -> RestartOutcome {
        RestartOutcome {
            root: DeploymentName::from("db"),
            trigger_reason: "pod db-1 deleted".to_string(),
            wave_id: WaveId::generate(),
            started_at: Utc::now(),
            targets,
        }
    }

    #[test]
    fn partitions_targets_by_status() {
        let outcome = outcome(vec![
            target("api", TargetStatus::Restarted),
            target("worker", TargetStatus::CooldownActive),
            target(
                "frontend",
                TargetStatus::Failed {
                    error: "forbidden".to_string(),
                },
            ),
        ]);

        assert_eq!(outcome.restarted(), vec![&DeploymentName::from("api")]);
        assert_eq!(outcome.skipped(), vec![&DeploymentName::from("worker")]);
        assert_eq!(
            outcome.failed(),
            vec![(&DeploymentName::from("frontend"), "forbidden")]
        );
        assert!(outcome.has_failures());
    }

    #[test]
    fn empty_outcome_has_no_failures() {
        let outcome = outcome(Vec::new());
        assert!(outcome.is_empty());
        assert!(!outcome.has_failures());
        assert!(outcome.target(&DeploymentName::from("api")).is_none());
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(TargetStatus::Failed {
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
