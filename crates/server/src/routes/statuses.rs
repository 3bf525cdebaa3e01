// crates/server/src/routes/statuses.rs
//! Job status list, detail and operator action endpoints.
//!
//! - GET    /statuses        - filtered, sorted, paginated list
//! - GET    /statuses/{jid}  - one enriched status (404 if unknown)
//! - PUT    /statuses        - retry `jid` from the retry or dead set
//! - DELETE /statuses        - remove all status data for `jid`
//!
//! Actions answer with a 303 redirect back to the referring page, whether
//! or not the job existed.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Form, Path, Query, State},
    http::{header, HeaderMap},
    response::Redirect,
    routing::get,
    Json, Router,
};
use jobwatch_core::{EnrichedStatus, ListQuery, ListView, RetryOutcome};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_action, record_list_size, RequestTimer};
use crate::state::AppState;

/// Fallback redirect target when the request carries no usable `Referer`.
const LIST_PATH: &str = "/statuses";

/// `jid` parameter of the action endpoints, from the form body or query.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JidParams {
    pub jid: Option<String>,
}

/// GET /api/statuses - List in-flight job statuses.
///
/// Query: `worker`, `status`, `sort_by`, `sort_dir`, `page`, `per_page`
/// (`all` for a single page), `poll`. Invalid values fall back to defaults
/// and a repeated parameter keeps its last value.
pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ListView>> {
    let timer = RequestTimer::new("statuses_list");
    let query = ListQuery::from_pairs(pairs);
    let result = state
        .statuses
        .list_statuses(&query)
        .await
        .map_err(ApiError::from);
    timer.finish_result(&result);

    let view = result?;
    record_list_size(view.total_size);
    Ok(Json(view))
}

/// GET /api/statuses/{jid} - Single enriched job status.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(jid): Path<String>,
) -> ApiResult<Json<EnrichedStatus>> {
    let timer = RequestTimer::new("statuses_get");
    let result = state
        .statuses
        .get_status(&jid)
        .await
        .map_err(ApiError::from);
    timer.finish_result(&result);
    Ok(Json(result?))
}

/// PUT /api/statuses - Retry a failed job.
pub async fn retry_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<JidParams>,
    form: Result<Form<JidParams>, FormRejection>,
) -> ApiResult<Redirect> {
    let jid = action_jid(query, form)?;
    let outcome = state.statuses.retry_job(&jid).await?;
    let label = match outcome {
        RetryOutcome::Requeued { .. } => "requeued",
        RetryOutcome::NotFound => "not_found",
    };
    record_action("retry", label);
    Ok(back_to_referer(&headers))
}

/// DELETE /api/statuses - Remove a job's status data.
pub async fn delete_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<JidParams>,
    form: Result<Form<JidParams>, FormRejection>,
) -> ApiResult<Redirect> {
    let jid = action_jid(query, form)?;
    state.statuses.delete_job(&jid).await?;
    record_action("delete", "deleted");
    Ok(back_to_referer(&headers))
}

/// Prefer the form body's `jid`, then the query string's.
fn action_jid(query: JidParams, form: Result<Form<JidParams>, FormRejection>) -> ApiResult<String> {
    form.ok()
        .and_then(|Form(params)| params.jid)
        .or(query.jid)
        .filter(|jid| !jid.is_empty())
        .ok_or_else(|| ApiError::BadRequest("jid is required".to_string()))
}

fn back_to_referer(headers: &HeaderMap) -> Redirect {
    let target = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(LIST_PATH);
    Redirect::to(target)
}

/// Create the statuses router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/statuses",
            get(list_statuses).put(retry_status).delete(delete_status),
        )
        .route("/statuses/{jid}", get(get_status))
}
