use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde_json::json;

use foliotrack_core::{
    clock::format_timestamp,
    visit::{TrackPayload, VisitRecord, VisitStatus, UNKNOWN},
    visitor::{new_visitor_id, referrer_source},
};

use crate::{error::AppError, geo::GeoInfo, state::AppState};

/// Longest accepted `path` or `event` value, in bytes.
const MAX_PATH_LEN: usize = 512;

/// Longest accepted client-supplied visitor id, in bytes.
const MAX_VISITOR_ID_LEN: usize = 128;

/// Headers consulted for the client IP, most specific first.
const CLIENT_IP_HEADERS: [&str; 6] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "x-client-ip",
    "x-cluster-client-ip",
    "forwarded",
];

/// `POST /api/analytics`: log one page view or tracked interaction.
///
/// ## Auth
/// None. The tracker script on every page calls this.
///
/// ## Enrichment
/// - `visitorId`: the client's stored id, or a fresh UUID v4.
/// - `status`: `Existing` only when a client id was sent and already appears in
///   the log; decided here once and never revisited.
/// - geo columns: offline MaxMind City lookup of the client IP, `"Unknown"`
///   otherwise.
/// - `isp`: organisation from the MaxMind ASN database, else `"Unknown"`.
/// - `referrer`: hostname of the referrer URL or `"Direct"`.
/// - `path`: `EVENT: <event>` for interactions, else the page path (`/` default).
///
/// ## Response
/// `200 OK` with `{ "success": true, "visitorId": "...", "isNew": bool }`.
#[tracing::instrument(skip(state, headers, payload))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<TrackPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&payload)?;

    let client_ip = extract_client_ip(&headers);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string();

    let supplied_id = payload
        .visitor_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let is_existing = match supplied_id {
        Some(id) => match state.store.visitor_exists(id).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(error = %e, "Visitor lookup failed, logging as New");
                false
            }
        },
        None => false,
    };
    let status = if is_existing {
        VisitStatus::Existing
    } else {
        VisitStatus::New
    };

    let visitor_id = supplied_id
        .map(str::to_string)
        .unwrap_or_else(new_visitor_id);

    let geo = state
        .geo
        .as_ref()
        .and_then(|g| g.lookup(&client_ip))
        .unwrap_or_else(GeoInfo::unknown);
    let isp = state
        .isp
        .as_ref()
        .and_then(|l| l.lookup(&client_ip))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let record = VisitRecord {
        timestamp: format_timestamp(state.now()),
        visitor_id: visitor_id.clone(),
        ip: client_ip,
        country: geo.country,
        region: geo.region,
        city: geo.city,
        timezone: geo.timezone,
        isp,
        user_agent,
        referrer: referrer_source(payload.referrer.as_deref()),
        latitude: geo.latitude,
        longitude: geo.longitude,
        source: geo.source,
        status: status.as_str().to_string(),
        path: payload.logged_path(),
    };

    state
        .store
        .append_visit(&record)
        .await
        .map_err(AppError::Internal)?;

    tracing::info!(
        path = %record.path,
        status = %record.status,
        country = %record.country,
        "Visit logged"
    );

    Ok(Json(json!({
        "success": true,
        "visitorId": visitor_id,
        "isNew": !is_existing
    })))
}

fn validate(payload: &TrackPayload) -> Result<(), AppError> {
    for (field, value) in [("path", &payload.path), ("event", &payload.event)] {
        if value.as_deref().is_some_and(|v| v.len() > MAX_PATH_LEN) {
            return Err(AppError::BadRequest(format!(
                "{field} exceeds {MAX_PATH_LEN} bytes"
            )));
        }
    }
    if payload
        .visitor_id
        .as_deref()
        .is_some_and(|v| v.len() > MAX_VISITOR_ID_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "visitorId exceeds {MAX_VISITOR_ID_LEN} bytes"
        )));
    }
    if payload.event.as_deref().is_some_and(|e| e.trim().is_empty()) {
        return Err(AppError::BadRequest("event must not be empty".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First non-empty client IP from the proxy headers, or `"unknown"`.
///
/// Comma-separated headers contribute their first entry only.
fn extract_client_ip(headers: &HeaderMap) -> String {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .filter_map(|s| s.split(',').next())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
