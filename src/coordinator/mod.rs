//! Restart cascade coordination.
//!
//! # Architecture
//!
//! The coordinator sits between the pod watcher and the cluster:
//! - The dependency tree is rebuilt from the topology source on every call, so
//!   annotation changes take effect on the next restart without a resync loop
//! - Descendants are collected with the pure functions in [`crate::state`]
//! - Restarts are described as [`crate::effects::RestartCommand`] values and
//!   applied by a [`crate::effects::RestartExecutor`]
//!
//! # Key Invariants
//!
//! 1. **One wave per call**: every restart issued for one triggering event
//!    carries the same wave id.
//!
//! 2. **Deployment-scoped cooldown**: a deployment restarted by any cascade is
//!    not restarted again within the cooldown window, whichever root triggers.
//!
//! 3. **Failures stay local**: a failed patch is reported per target and does
//!    not stop the rest of the cascade.

pub mod engine;


pub use engine::{CooldownView, CoordinatorError, RestartCoordinator};
