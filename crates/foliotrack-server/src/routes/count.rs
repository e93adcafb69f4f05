use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /api/analytics/count`: total number of logged rows, for the public
/// visit counter on the portfolio home page.
///
/// Unauthenticated. A store failure is logged and reported as `0`, so the
/// counter never breaks the page that embeds it.
#[tracing::instrument(skip(state))]
pub async fn visit_count(State(state): State<Arc<AppState>>) -> Json<Value> {
    let count = match state.store.count_visits().await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "Visit count unavailable, reporting 0");
            0
        }
    };
    Json(json!({ "count": count }))
}
