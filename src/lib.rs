//! Restart Controller - keeps dependent Kubernetes deployments in step with
//! their parents.
//!
//! When a pod of a deployment is deleted or its containers restart, every
//! deployment that declares it as an ancestor (through the
//! `restart-controller/parent` annotation) is rolled once, subject to a
//! per-deployment cooldown.
//!
//! The pure core lives in [`state`]; [`coordinator`] drives it against the
//! effect traits in [`effects`], which [`cluster`] implements with kube.

pub mod cluster;
pub mod config;
pub mod coordinator;
pub mod effects;
pub mod server;
pub mod state;
pub mod supervisor;
pub mod types;
pub mod watch;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_utils;
