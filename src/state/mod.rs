//! Pure state logic for the restart controller.
//!
//! This module contains the functional core: building the dependency tree from
//! parent declarations, collecting the descendants of a restarted deployment,
//! and tracking per-deployment cooldowns. All I/O happens elsewhere.

pub mod cooldown;
pub mod descendants;
pub mod topology;

// Re-export commonly used types and functions
pub use cooldown::{Admission, CooldownEntry, CooldownLedger, DEFAULT_COOLDOWN_SECS};
pub use descendants::{CascadeTarget, collect_cascade, collect_descendants};
pub use topology::{DependencyTree, MalformedGraphError, ParentDeclarations, detect_cycle};
