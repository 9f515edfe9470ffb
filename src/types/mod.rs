//! Core domain types for the restart controller.
//!
//! Identifiers are newtypes so deployment names and wave ids cannot be mixed up.

pub mod ids;
pub mod outcome;

// Re-export commonly used types at the module level
pub use ids::{DeploymentName, WaveId};
pub use outcome::{RestartOutcome, TargetOutcome, TargetStatus};
