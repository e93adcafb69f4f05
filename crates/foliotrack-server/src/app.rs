use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, error::AppError, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `CorsLayer`: the tracker runs on the portfolio origin, which may differ
///    from the API host. `FOLIOTRACK_CORS_ORIGINS` narrows it; empty means any.
/// 2. `CompressionLayer`: gzip for the dashboard JSON and CSV export.
/// 3. `TraceLayer`: structured request/response logging via `tracing`.
///
/// `/api/admin/*` additionally sits behind [`auth::require_admin`].
pub fn build_app(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/api/admin/analytics", get(routes::dashboard::get_dashboard))
        .route(
            "/api/admin/analytics/export",
            get(routes::export::export_visits),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_admin,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/analytics", post(routes::track::track))
        .route("/api/analytics/count", get(routes::count::visit_count))
        .merge(admin)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if allowed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}
