use std::sync::Arc;

use axum::{extract::State, Json};

use foliotrack_core::aggregate::{summarize, DashboardSummary};

use crate::{error::AppError, state::AppState};

/// `GET /api/admin/analytics`: dashboard aggregates over the whole visit log.
///
/// Bearer-gated by [`crate::auth::require_admin`]. The log is read in full and
/// summarised against the state clock; a store failure is the only error.
#[tracing::instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, AppError> {
    let visits = state
        .store
        .read_all_visits()
        .await
        .map_err(AppError::Internal)?;

    let summary = summarize(&visits, state.now());
    tracing::debug!(rows = visits.len(), "Dashboard summary computed");

    Ok(Json(summary))
}
