use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::error::Error;
use crate::identifier::IdentifierSource;
use crate::lookup::LookupBackend;
use crate::rate_limiter::AdmissionGate;
use crate::response::HealthResponse;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn LookupBackend>,
    pub gate: Arc<AdmissionGate>,
    pub source: Arc<IdentifierSource>,
}

/// Look up the value stored under the request's identifier.
///
/// Only reached for admitted requests.
pub async fn lookup(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, Error> {
    let key = state.source.extract(&uri, &headers);

    let value = state.backend.get(&key).await.map_err(|err| {
        warn!(target: "lookup_gate::handlers", key = %key, error = %err, "Lookup failed");
        err
    })?;

    Ok(match value {
        Some(value) => (StatusCode::OK, value).into_response(),
        None => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let backend_connected = state.backend.ping().await.is_ok();
    let config = state.gate.config();

    Json(HealthResponse::new(
        backend_connected,
        state.gate.store().tracked(),
        config.max_requests(),
        u64::try_from(config.window_size().as_millis()).unwrap_or(u64::MAX),
    ))
}
