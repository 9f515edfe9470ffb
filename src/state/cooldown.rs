//! Per-deployment cooldown tracking.
//!
//! The ledger remembers when the controller last restarted each deployment and
//! refuses a new restart until the cooldown window has elapsed. Admission is a
//! single check-and-record step, so concurrent cascades that both reach the
//! same deployment cannot both restart it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DeploymentName;

/// Default cooldown window in seconds.
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// A recorded restart for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownEntry {
    pub deployment: DeploymentName,
    pub last_restart: DateTime<Utc>,
}

/// One recorded restart. `seq` tells apart admissions made at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Entries {
    next_seq: u64,
    by_deployment: HashMap<DeploymentName, Stamp>,
}

/// Proof that a deployment was admitted at a given instant.
///
/// Returned by [`CooldownLedger::admit`] and handed back to
/// [`CooldownLedger::revoke`] if the restart could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    deployment: DeploymentName,
    stamp: Stamp,
    previous: Option<Stamp>,
}

impl Admission {
    pub fn deployment(&self) -> &DeploymentName {
        &self.deployment
    }

    pub fn admitted_at(&self) -> DateTime<Utc> {
        self.stamp.at
    }

    /// The restart this admission replaced.
    pub fn previous(&self) -> Option<DateTime<Utc>> {
        self.previous.map(|stamp| stamp.at)
    }
}

/// In-memory record of the last controller-triggered restart per deployment.
///
/// State is lost when the process exits.
#[derive(Debug)]
pub struct CooldownLedger {
    window: Duration,
    window_delta: TimeDelta,
    last_restart: Mutex<Entries>,
}

impl Default for CooldownLedger {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_COOLDOWN_SECS))
    }
}

impl CooldownLedger {
    pub fn new(window: Duration) -> Self {
        CooldownLedger {
            window,
            window_delta: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            last_restart: Mutex::new(Entries::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn entries_guard(&self) -> MutexGuard<'_, Entries> {
        self.last_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits `deployment` for a restart at `now` if it is outside its cooldown
    /// window, recording `now` as its last restart.
    ///
    /// Returns `None` without touching the ledger if the deployment was
    /// restarted less than one window before `now`, or if `now` is earlier than
    /// the recorded restart.
    pub fn admit(&self, deployment: &DeploymentName, now: DateTime<Utc>) -> Option<Admission> {
        let mut entries = self.entries_guard();
        let previous = entries.by_deployment.get(deployment).copied();

        if let Some(last) = previous
            && now.signed_duration_since(last.at) < self.window_delta
        {
            return None;
        }

        let stamp = Stamp {
            at: now,
            seq: entries.next_seq,
        };
        entries.next_seq += 1;
        entries.by_deployment.insert(deployment.clone(), stamp);
        Some(Admission {
            deployment: deployment.clone(),
            stamp,
            previous,
        })
    }

    /// Boolean form of [`CooldownLedger::admit`].
    pub fn try_admit(&self, deployment: &DeploymentName, now: DateTime<Utc>) -> bool {
        self.admit(deployment, now).is_some()
    }

    /// Undoes an admission whose restart was never applied.
    ///
    /// The entry is restored to what it was before the admission, but only if no
    /// later admission has replaced it. Returns whether anything changed.
    pub fn revoke(&self, admission: Admission) -> bool {
        let mut entries = self.entries_guard();

        if entries.by_deployment.get(&admission.deployment) != Some(&admission.stamp) {
            return false;
        }

        match admission.previous {
            Some(previous) => {
                entries.by_deployment.insert(admission.deployment, previous);
            }
            None => {
                entries.by_deployment.remove(&admission.deployment);
            }
        }
        true
    }

    /// Returns the last recorded restart for `deployment`, if any.
    pub fn peek(&self, deployment: &DeploymentName) -> Option<DateTime<Utc>> {
        self.entries_guard()
            .by_deployment
            .get(deployment)
            .map(|stamp| stamp.at)
    }

    /// Returns a snapshot of all entries, sorted by deployment name.
    pub fn entries(&self) -> Vec<CooldownEntry> {
        let mut snapshot: Vec<CooldownEntry> = self
            .entries_guard()
            .by_deployment
            .iter()
            .map(|(deployment, stamp)| CooldownEntry {
                deployment: deployment.clone(),
                last_restart: stamp.at,
            })
            .collect();
        snapshot.sort_by(|a, b| a.deployment.cmp(&b.deployment));
        snapshot
    }
}
