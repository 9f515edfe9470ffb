//! Restart commands as data.
//!
//! A [`RestartCommand`] describes one annotation patch on a deployment's pod
//! template. Changing the template annotations makes the deployment controller
//! roll out new pods, which is how the restart actually happens.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DeploymentName, WaveId};

/// Deployment annotation naming the deployment's parent.
pub const PARENT_ANNOTATION: &str = "restart-controller/parent";

/// Pod template annotation holding the time of the last controller restart.
pub const LAST_RESTART_ANNOTATION: &str = "restart-controller/last-restart";

/// Pod template annotation holding the reason for the last controller restart.
pub const RESTART_REASON_ANNOTATION: &str = "restart-controller/restart-reason";

/// Pod template annotation holding the wave id of the last controller restart.
pub const RESTART_WAVE_ANNOTATION: &str = "restart-controller/restart-wave";

/// Request to restart one deployment as part of a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartCommand {
    pub deployment: DeploymentName,
    pub wave_id: WaveId,
    pub reason: String,
    pub restarted_at: DateTime<Utc>,
}

impl RestartCommand {
    /// Returns the pod template annotations this command sets.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                LAST_RESTART_ANNOTATION.to_string(),
                format_restart_time(self.restarted_at),
            ),
            (RESTART_REASON_ANNOTATION.to_string(), self.reason.clone()),
            (RESTART_WAVE_ANNOTATION.to_string(), self.wave_id.to_string()),
        ])
    }
}

/// Formats a restart time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_restart_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
