use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health`: can the visit log still be queried?
///
/// `200 {"status":"ok"}` while the DuckDB file answers; `503
/// {"status":"degraded"}` once it stops (file locked by another foliotrack
/// process, data directory gone). Ingest and the dashboard would fail with
/// 500 in that state, so orchestrators restart on this signal.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, label) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Visit log unreadable, reporting degraded");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        status,
        Json(json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
