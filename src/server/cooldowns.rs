//! Cooldown inspection endpoints.
//!
//! Read-only view of when the controller last restarted each deployment.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::AppState;
use crate::state::CooldownEntry;
use crate::types::DeploymentName;

/// Errors that can occur when fetching a cooldown entry.
#[derive(Debug, Error)]
pub enum CooldownLookupError {
    /// The controller has not restarted this deployment since it started.
    #[error("no restart recorded for deployment {0}")]
    NotFound(DeploymentName),
}

impl IntoResponse for CooldownLookupError {
    fn into_response(self) -> Response {
        let status = match &self {
            CooldownLookupError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

/// Lists every recorded restart, sorted by deployment name.
///
/// # Example
///
/// ```ignore
/// GET /api/v1/cooldowns HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// [{"deployment": "api", "last_restart": "2024-05-01T12:00:00Z"}]
/// ```
pub async fn list_cooldowns_handler(State(app_state): State<AppState>) -> Json<Vec<CooldownEntry>> {
    Json(app_state.cooldowns().cooldowns())
}

/// Returns the last restart of one deployment, or 404 if there is none.
pub async fn cooldown_handler(
    State(app_state): State<AppState>,
    Path(deployment): Path<String>,
) -> Result<Json<CooldownEntry>, CooldownLookupError> {
    let deployment = DeploymentName::from(deployment);
    match app_state.cooldowns().last_restart(&deployment) {
        Some(last_restart) => Ok(Json(CooldownEntry {
            deployment,
            last_restart,
        })),
        None => Err(CooldownLookupError::NotFound(deployment)),
    }
}
