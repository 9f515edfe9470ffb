//! Pod restart detection.
//!
//! Pure bookkeeping over pod objects: remembers the total container restart
//! count of each pod and reports when it goes up or when the pod goes away.

use std::collections::{HashMap, HashSet};
use std::fmt;

use k8s_openapi::api::core::v1::Pod;

/// Why a pod counts as restarted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartReason {
    /// The pod was deleted (evicted, rolled, or removed by hand).
    Deleted { pod: String },

    /// The sum of its containers' restart counts increased.
    ContainerRestarted {
        pod: String,
        previous: i32,
        current: i32,
    },
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::Deleted { pod } => write!(f, "pod {pod} deleted"),
            RestartReason::ContainerRestarted {
                pod,
                previous,
                current,
            } => write!(
                f,
                "pod {pod} containers restarted (count {previous} -> {current})"
            ),
        }
    }
}

/// Tracks container restart counts per pod name.
///
/// The first observation of a pod only records a baseline. A later observation
/// with a higher count is a restart.
#[derive(Debug, Default)]
pub struct PodRestartDetector {
    restart_counts: HashMap<String, i32>,

    /// Pods seen since the watch stream started a re-list, if one is in progress.
    resync_seen: Option<HashSet<String>>,
}

impl PodRestartDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pod's current restart count and reports whether it went up.
    ///
    /// Pods without a name or without container statuses are ignored.
    pub fn observe(&mut self, pod: &Pod) -> Option<RestartReason> {
        let name = pod.metadata.name.as_deref()?;
        let current = total_restart_count(pod)?;

        if let Some(seen) = self.resync_seen.as_mut() {
            seen.insert(name.to_string());
        }

        let previous = self.restart_counts.insert(name.to_string(), current)?;
        (current > previous).then(|| RestartReason::ContainerRestarted {
            pod: name.to_string(),
            previous,
            current,
        })
    }

    /// Forgets the pod's baseline and reports the deletion.
    pub fn forget(&mut self, pod: &Pod) -> Option<RestartReason> {
        let name = pod.metadata.name.as_deref()?;
        self.restart_counts.remove(name);
        Some(RestartReason::Deleted {
            pod: name.to_string(),
        })
    }

    /// Marks the start of a full re-list of pods.
    pub fn begin_resync(&mut self) {
        self.resync_seen = Some(HashSet::new());
    }

    /// Marks the end of a re-list, dropping baselines for pods that no longer
    /// exist. Returns how many were dropped.
    pub fn finish_resync(&mut self) -> usize {
        let Some(seen) = self.resync_seen.take() else {
            return 0;
        };
        let before = self.restart_counts.len();
        self.restart_counts.retain(|name, _| seen.contains(name));
        before - self.restart_counts.len()
    }

    /// Returns the recorded restart count for a pod.
    pub fn baseline(&self, pod: &str) -> Option<i32> {
        self.restart_counts.get(pod).copied()
    }

    /// Returns the number of pods with a recorded baseline.
    pub fn tracked(&self) -> usize {
        self.restart_counts.len()
    }
}

/// Sums the restart counts of all containers in the pod.
///
/// Returns `None` if the pod reports no container statuses yet.
pub fn total_restart_count(pod: &Pod) -> Option<i32> {
    let statuses = pod.status.as_ref()?.container_statuses.as_ref()?;
    if statuses.is_empty() {
        return None;
    }
    Some(statuses.iter().map(|s| s.restart_count).sum())
}

/// Returns the name of the ReplicaSet that owns the pod, if any.
pub fn replica_set_owner(pod: &Pod) -> Option<&str> {
    pod.metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|owner| owner.kind == "ReplicaSet")
        .map(|owner| owner.name.as_str())
}
