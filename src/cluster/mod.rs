//! Kubernetes client and effect interpreter.
//!
//! This module implements the effect traits from [`crate::effects`] on top of
//! the kube client.
//!
//! Key features:
//! - Exponential backoff retry for transient failures
//! - Distinguishes transient vs permanent errors
//! - Restarts as merge patches of pod template annotations

mod client;
mod error;
mod interpreter;
mod retry;

pub use client::ClusterClient;
pub use error::{ClusterApiError, ClusterErrorKind};
pub use interpreter::{
    deployment_owner_of, parent_declarations_of, patch_body, restart_deployment,
};
pub use retry::{Backoff, with_backoff};
