//! Worker message types for async communication.
//!
//! The pod watcher sends these messages to the coordinator worker over a
//! bounded channel.

use chrono::{DateTime, Utc};

use crate::types::DeploymentName;

/// A deployment whose pods were observed restarting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartTrigger {
    pub deployment: DeploymentName,

    /// Human-readable description of what was observed.
    pub reason: String,

    pub observed_at: DateTime<Utc>,
}

/// Messages that can be sent to the coordinator worker.
///
/// The worker processes these serially, so triggers for the same deployment
/// are handled in the order they were observed.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Cascade restarts to the dependents of a restarted deployment.
    PodRestarted(RestartTrigger),

    /// Request a graceful shutdown.
    ///
    /// The worker finishes the current cascade and exits its event loop.
    Shutdown,
}
