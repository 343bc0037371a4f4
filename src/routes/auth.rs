// Shared-secret gate for every protected route.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    Unauthorized,
}

/// Exact match of the presented key against the configured secret.
pub fn check_api_key(provided: Option<&str>, expected: &str) -> AuthDecision {
    match provided {
        Some(key) if !expected.is_empty() && constant_time_eq(key.as_bytes(), expected.as_bytes()) => {
            AuthDecision::Authorized
        }
        _ => AuthDecision::Unauthorized,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware: short-circuits with 401 before the handler (and its body extractors) run.
pub(super) async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    match check_api_key(provided, &state.config.auth.api_key) {
        AuthDecision::Authorized => Ok(next.run(request).await),
        AuthDecision::Unauthorized => {
            tracing::warn!(
                path = %request.uri().path(),
                key_present = provided.is_some(),
                "rejected request: bad or missing API key"
            );
            Err(ApiError::Unauthorized)
        }
    }
}
