use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

/// Gate for `/api/admin/*`: the `Authorization: Bearer <token>` header must
/// carry the configured admin token.
///
/// With no token configured every request is rejected.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match (presented, state.config.admin_token.as_deref()) {
        (Some(token), Some(expected)) if tokens_match(token, expected) => next.run(request).await,
        (_, None) => {
            tracing::warn!("Admin request rejected: FOLIOTRACK_ADMIN_TOKEN is not set");
            AppError::Unauthorized.into_response()
        }
        _ => AppError::Unauthorized.into_response(),
    }
}

/// Length-then-bytes comparison that does not exit early on the first
/// mismatching byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_match_exact_only() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3cret", "s3creT"));
        assert!(!tokens_match("s3cre", "s3cret"));
        assert!(!tokens_match("", "s3cret"));
    }
}
