//! Coordinator worker.
//!
//! Drains restart triggers from the channel and runs one cascade per trigger.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::coordinator::RestartCoordinator;
use crate::effects::{RestartExecutor, TopologySource};
use crate::types::RestartOutcome;

use super::message::{RestartTrigger, WorkerMessage};

/// Runs restart cascades for triggers received from the pod watcher.
pub struct CoordinatorWorker<S, E> {
    coordinator: Arc<RestartCoordinator<S, E>>,
}

impl<S, E> CoordinatorWorker<S, E>
where
    S: TopologySource + Send + Sync,
    E: RestartExecutor + Send + Sync,
{
    pub fn new(coordinator: Arc<RestartCoordinator<S, E>>) -> Self {
        CoordinatorWorker { coordinator }
    }

    /// Runs the worker event loop.
    ///
    /// Stops when `shutdown` is cancelled, a `Shutdown` message arrives, or
    /// every sender has been dropped. A cascade already in progress is
    /// finished before the loop checks for shutdown again.
    #[instrument(skip_all)]
    pub async fn run(self, mut rx: mpsc::Receiver<WorkerMessage>, shutdown: CancellationToken) {
        info!("Worker event loop started");

        loop {
            tokio::select! {
                // Graceful shutdown
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping worker");
                    break;
                }

                msg = rx.recv() => {
                    match msg {
                        Some(WorkerMessage::PodRestarted(trigger)) => {
                            self.handle_trigger(trigger).await;
                        }
                        Some(WorkerMessage::Shutdown) => {
                            info!("Shutdown message received");
                            break;
                        }
                        None => {
                            // Channel closed, all senders dropped
                            info!("Message channel closed");
                            break;
                        }
                    }
                }
            }
        }

        info!("Worker event loop stopped");
    }

    async fn handle_trigger(&self, trigger: RestartTrigger) {
        info!(
            deployment = %trigger.deployment,
            reason = %trigger.reason,
            "Handling pod restart"
        );

        match self
            .coordinator
            .on_pod_restart(&trigger.deployment, &trigger.reason, trigger.observed_at)
            .await
        {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => error!(
                deployment = %trigger.deployment,
                error = %e,
                "Restart cascade aborted"
            ),
        }
    }
}

fn log_outcome(outcome: &RestartOutcome) {
    if outcome.is_empty() {
        return;
    }

    let restarted = outcome.restarted().len();
    let skipped = outcome.skipped().len();
    let failed = outcome.failed().len();

    if outcome.has_failures() {
        warn!(
            root = %outcome.root,
            wave = %outcome.wave_id,
            restarted,
            skipped,
            failed,
            "Restart cascade finished with failures"
        );
    } else {
        info!(
            root = %outcome.root,
            wave = %outcome.wave_id,
            restarted,
            skipped,
            "Restart cascade finished"
        );
    }
}
