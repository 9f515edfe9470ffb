//! Coordinator worker for restart triggers.
//!
//! # Architecture
//!
//! - The pod watcher pushes triggers onto a bounded `tokio::sync::mpsc` channel
//! - A single worker drains the channel and runs one cascade per trigger, so
//!   the watch loop never waits on API calls made during a cascade
//! - Shutdown is signalled through a `CancellationToken` or a `Shutdown`
//!   message
//!
//! # Module Structure
//!
//! - [`message`]: Worker message types for async communication
//! - [`worker`]: The worker event loop

mod message;
#[allow(clippy::module_inception)]
mod worker;

pub use message::{RestartTrigger, WorkerMessage};
pub use worker::CoordinatorWorker;
