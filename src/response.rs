use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::rate_limiter::Verdict;

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// 429 response for a rejected identifier. The body echoes the identifier.
pub fn rejected(identifier: &str, verdict: &Verdict) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            (RATE_LIMIT_LIMIT, HeaderValue::from(verdict.limit)),
            (RATE_LIMIT_REMAINING, HeaderValue::from(verdict.remaining())),
        ],
        identifier.to_string(),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub backend_connected: bool,
    pub tracked_identifiers: usize,
    pub max_requests: u64,
    pub window_size_ms: u64,
}

impl HealthResponse {
    pub fn new(
        backend_connected: bool,
        tracked_identifiers: usize,
        max_requests: u64,
        window_size_ms: u64,
    ) -> Self {
        let status = if backend_connected { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend_connected,
            tracked_identifiers,
            max_requests,
            window_size_ms,
        }
    }
}
