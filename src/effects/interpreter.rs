//! Interpreter traits for the controller's cluster effects.
//!
//! The coordinator and pod watcher only talk to the cluster through these
//! traits. The kube-backed implementations live in [`crate::cluster`]; tests
//! use in-memory mocks.

use std::fmt::Display;
use std::future::Future;

use crate::state::ParentDeclarations;
use crate::types::DeploymentName;

use super::restart::RestartCommand;

/// Applies restart commands to deployments.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct RecordingExecutor {
///     applied: Mutex<Vec<RestartCommand>>,
/// }
///
/// impl RestartExecutor for RecordingExecutor {
///     type Error = String;
///
///     async fn execute(&self, command: RestartCommand) -> Result<(), Self::Error> {
///         self.applied.lock().unwrap().push(command);
///         Ok(())
///     }
/// }
/// ```
pub trait RestartExecutor {
    /// The error type returned by this executor. Its display text is recorded
    /// in the restart outcome.
    type Error: Display;

    /// Patch the deployment named in `command`.
    fn execute(
        &self,
        command: RestartCommand,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Lists the current parent declarations of all deployments.
pub trait TopologySource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every known deployment mapped to its declared parent, if any.
    fn parent_declarations(
        &self,
    ) -> impl Future<Output = Result<ParentDeclarations, Self::Error>> + Send;
}

/// Resolves the deployment that owns a ReplicaSet.
pub trait ReplicaSetOwners {
    type Error: Display;

    /// Returns `Ok(None)` if the ReplicaSet exists but is not owned by a
    /// deployment.
    fn deployment_owner(
        &self,
        replica_set: &str,
    ) -> impl Future<Output = Result<Option<DeploymentName>, Self::Error>> + Send;
}
