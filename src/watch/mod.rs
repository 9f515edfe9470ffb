//! Pod watching.
//!
//! Detects pod restarts in the watched namespace and resolves the deployment
//! each pod belongs to (pod -> ReplicaSet -> Deployment).
//!
//! - [`restarts`]: pure restart-count bookkeeping
//! - [`owners`]: cached ReplicaSet owner lookups
//! - [`pods`]: the watch loop feeding the coordinator worker

pub mod owners;
pub mod pods;
pub mod restarts;

pub use owners::OwnerResolver;
pub use pods::{PodWatcher, run_pod_watcher};
pub use restarts::{PodRestartDetector, RestartReason, replica_set_owner, total_restart_count};
