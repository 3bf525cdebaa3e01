//! API route handlers for the jobwatch server.

pub mod health;
pub mod metrics;
pub mod statuses;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router: JSON API under `/api`, Prometheus at `/metrics`.
///
/// Routes:
/// - GET    /api/health          - Health check
/// - GET    /api/statuses        - Filtered, sorted, paginated job statuses
/// - GET    /api/statuses/{jid}  - One enriched job status
/// - PUT    /api/statuses        - Retry a failed job (`jid` form field)
/// - DELETE /api/statuses        - Delete a job's status data (`jid` form field)
/// - GET    /metrics             - Prometheus metrics
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", statuses::router())
        .merge(metrics::router())
        .with_state(state)
}
