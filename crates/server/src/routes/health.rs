// crates/server/src/routes/health.rs
//! Liveness plus a reachability check of the job work snapshot.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the work snapshot cannot be read.
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Worker classes the dashboard lists.
    pub observed_jobs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<usize>,
}

/// GET /api/health - Always 200; a broken store shows as `degraded`.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let in_flight = match state.statuses.in_flight_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read work snapshot");
            None
        }
    };

    Json(HealthResponse {
        status: if in_flight.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
        observed_jobs: state.statuses.config().observed_jobs.len(),
        in_flight,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use jobwatch_core::memory::MemoryBackends;
    use jobwatch_core::{DashboardConfig, StatusRecord, StatusService, StoreError, WorkSnapshot};
    use tower::ServiceExt;

    struct UnreachableWork;

    #[async_trait]
    impl WorkSnapshot for UnreachableWork {
        async fn in_flight_jids(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::unavailable("connection refused"))
        }
    }

    async fn health(state: Arc<AppState>) -> serde_json::Value {
        let response = crate::create_app(state)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_in_flight_jobs() {
        let backends = MemoryBackends::new();
        backends.track(StatusRecord::new("a"));
        backends.track(StatusRecord::new("b"));
        let config = DashboardConfig::default().with_observed_jobs(["ReportWorker"]);

        let json = health(AppState::in_memory(&backends, config)).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["observed_jobs"], 1);
        assert_eq!(json["in_flight"], 2);
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn test_health_degraded_when_snapshot_unreachable() {
        let backends = MemoryBackends::new();
        let service = StatusService::new(
            backends.store.clone(),
            Arc::new(UnreachableWork),
            backends.retry_set.clone(),
            backends.dead_set.clone(),
            DashboardConfig::default(),
        );

        let json = health(AppState::new(service)).await;
        assert_eq!(json["status"], "degraded");
        assert!(json.get("in_flight").is_none());
    }
}
