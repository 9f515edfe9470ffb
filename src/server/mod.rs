//! HTTP server for the restart controller.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns 200 if the server is running
//! - `GET /api/v1/cooldowns` - Lists the last controller restart per deployment
//! - `GET /api/v1/cooldowns/{deployment}` - Last controller restart of one deployment

use std::sync::Arc;

use crate::coordinator::CooldownView;

pub mod cooldowns;
pub mod health;

pub use cooldowns::{cooldown_handler, list_cooldowns_handler};
pub use health::health_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    cooldowns: Arc<dyn CooldownView>,
}

impl AppState {
    pub fn new(cooldowns: Arc<dyn CooldownView>) -> Self {
        AppState { cooldowns }
    }

    /// Returns the read-only view of the coordinator's cooldown ledger.
    pub fn cooldowns(&self) -> &dyn CooldownView {
        self.cooldowns.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/cooldowns", get(list_cooldowns_handler))
        .route("/api/v1/cooldowns/{deployment}", get(cooldown_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, TimeZone, Utc};
    use http_body_util::BodyExt;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    use crate::state::CooldownEntry;
    use crate::types::DeploymentName;

    struct FixedCooldowns(BTreeMap<DeploymentName, DateTime<Utc>>);

    impl CooldownView for FixedCooldowns {
        fn last_restart(&self, deployment: &DeploymentName) -> Option<DateTime<Utc>> {
            self.0.get(deployment).copied()
        }

        fn cooldowns(&self) -> Vec<CooldownEntry> {
            self.0
                .iter()
                .map(|(deployment, last_restart)| CooldownEntry {
                    deployment: deployment.clone(),
                    last_restart: *last_restart,
                })
                .collect()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn test_app() -> axum::Router {
        let cooldowns = FixedCooldowns(BTreeMap::from([
            (DeploymentName::from("api"), t0()),
            (DeploymentName::from("frontend"), t0()),
        ]));
        build_router(AppState::new(Arc::new(cooldowns)))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Bytes) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    #[tokio::test]
    async fn health_returns_200() {
        let (status, body) = get(test_app(), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn lists_cooldowns_as_json() {
        let (status, body) = get(test_app(), "/api/v1/cooldowns").await;

        assert_eq!(status, StatusCode::OK);
        let entries: Vec<CooldownEntry> = serde_json::from_slice(&body).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.deployment.as_str()).collect();
        assert_eq!(names, vec!["api", "frontend"]);
        assert!(entries.iter().all(|e| e.last_restart == t0()));
    }

    #[tokio::test]
    async fn returns_single_cooldown() {
        let (status, body) = get(test_app(), "/api/v1/cooldowns/api").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["deployment"], "api");
        assert_eq!(json["last_restart"], "2024-05-01T12:00:00Z");
    }

    #[tokio::test]
    async fn unknown_deployment_returns_404() {
        let (status, body) = get(test_app(), "/api/v1/cooldowns/worker").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(&body[..], b"no restart recorded for deployment worker");
    }

    #[tokio::test]
    async fn empty_ledger_lists_nothing() {
        let app = build_router(AppState::new(Arc::new(FixedCooldowns(BTreeMap::new()))));

        let (status, body) = get(app, "/api/v1/cooldowns").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"[]");
    }
}
