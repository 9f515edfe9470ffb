//! Pod watch loop.
//!
//! Streams pod events from the API server, turns restarts of ReplicaSet-owned
//! pods into [`RestartTrigger`]s and sends them to the coordinator worker.

use std::pin::pin;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::{WatchStreamExt, watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::cluster::ClusterClient;
use crate::effects::ReplicaSetOwners;
use crate::worker::{RestartTrigger, WorkerMessage};

use super::owners::OwnerResolver;
use super::restarts::{PodRestartDetector, replica_set_owner};

/// Translates pod watch events into restart triggers.
#[derive(Debug)]
pub struct PodWatcher<L> {
    detector: PodRestartDetector,
    owners: OwnerResolver<L>,
}

impl<L: ReplicaSetOwners> PodWatcher<L> {
    pub fn new(lookup: L) -> Self {
        PodWatcher {
            detector: PodRestartDetector::new(),
            owners: OwnerResolver::new(lookup),
        }
    }

    /// Handles one watch event.
    ///
    /// Returns a trigger when a pod owned (through its ReplicaSet) by a
    /// deployment was deleted or had a container restart.
    pub async fn handle(
        &mut self,
        event: watcher::Event<Pod>,
        now: DateTime<Utc>,
    ) -> Option<RestartTrigger> {
        let (pod, reason) = match event {
            watcher::Event::Apply(pod) | watcher::Event::InitApply(pod) => {
                let reason = self.detector.observe(&pod)?;
                (pod, reason)
            }
            watcher::Event::Delete(pod) => {
                let reason = self.detector.forget(&pod)?;
                (pod, reason)
            }
            watcher::Event::Init => {
                debug!("Pod re-list started");
                self.detector.begin_resync();
                return None;
            }
            watcher::Event::InitDone => {
                let dropped = self.detector.finish_resync();
                debug!(
                    tracked = self.detector.tracked(),
                    dropped, "Pod re-list finished"
                );
                return None;
            }
        };

        let replica_set = replica_set_owner(&pod)?;
        let deployment = self.owners.resolve(replica_set).await?;

        info!(deployment = %deployment, reason = %reason, "Detected pod restart");
        Some(RestartTrigger {
            deployment,
            reason: reason.to_string(),
            observed_at: now,
        })
    }
}

/// Watches pods in the client's namespace and forwards restart triggers to
/// `sender` until `shutdown` is cancelled or the worker goes away.
///
/// Watch errors are logged and retried with the watcher's default backoff.
#[instrument(skip_all, fields(namespace = %client.namespace()))]
pub async fn run_pod_watcher(
    client: ClusterClient,
    sender: mpsc::Sender<WorkerMessage>,
    shutdown: CancellationToken,
) {
    let stream = watcher(client.pods(), watcher::Config::default()).default_backoff();
    let mut stream = pin!(stream);
    let mut pods = PodWatcher::new(client);

    info!("Pod watcher started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown signal received, stopping pod watcher");
                break;
            }

            event = stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        if let Some(trigger) = pods.handle(event, Utc::now()).await
                            && sender.send(WorkerMessage::PodRestarted(trigger)).await.is_err()
                        {
                            warn!("Worker channel closed, stopping pod watcher");
                            break;
                        }
                    }
                    Some(Err(e)) => warn!(error = %e, "Pod watch error"),
                    None => {
                        warn!("Pod watch stream ended");
                        break;
                    }
                }
            }
        }
    }

    info!("Pod watcher stopped");
}
