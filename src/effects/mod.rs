//! Effects-as-data for cluster operations.
//!
//! Restarts are described as [`RestartCommand`] values and carried out by an
//! interpreter, which keeps the coordinator free of I/O and lets tests
//! substitute in-memory interpreters.

pub mod interpreter;
pub mod restart;

pub use interpreter::{ReplicaSetOwners, RestartExecutor, TopologySource};
pub use restart::{
    LAST_RESTART_ANNOTATION, PARENT_ANNOTATION, RESTART_REASON_ANNOTATION,
    RESTART_WAVE_ANNOTATION, RestartCommand, format_restart_time,
};
