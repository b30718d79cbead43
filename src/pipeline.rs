//! Admission control in front of a downstream service.
//!
//! [`RequestPipeline`] wraps any tower service. Each request is counted
//! against its identifier before anything else happens; admitted requests go
//! to the wrapped service untouched and its response comes back unchanged,
//! rejected ones are answered here and never reach it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::Response;
use tower::{Layer, Service};
use tracing::warn;

use crate::identifier::IdentifierSource;
use crate::rate_limiter::AdmissionGate;
use crate::response;

/// Builds a [`RequestPipeline`] around the service it is applied to.
#[derive(Debug, Clone)]
pub struct RateLimitLayer {
    gate: Arc<AdmissionGate>,
    source: Arc<IdentifierSource>,
}

impl RateLimitLayer {
    pub fn new(gate: Arc<AdmissionGate>, source: IdentifierSource) -> Self {
        Self {
            gate,
            source: Arc::new(source),
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RequestPipeline<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestPipeline {
            inner,
            gate: Arc::clone(&self.gate),
            source: Arc::clone(&self.source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestPipeline<S> {
    inner: S,
    gate: Arc<AdmissionGate>,
    source: Arc<IdentifierSource>,
}

impl<S> RequestPipeline<S> {
    pub fn new(inner: S, gate: Arc<AdmissionGate>, source: IdentifierSource) -> Self {
        RateLimitLayer::new(gate, source).layer(inner)
    }
}

impl<S> Service<Request> for RequestPipeline<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let identifier = self.source.extract(request.uri(), request.headers());
        let verdict = self.gate.evaluate(&identifier);

        if verdict.is_admitted() {
            return Box::pin(self.inner.call(request));
        }

        warn!(
            target: "lookup_gate::pipeline",
            identifier = %identifier,
            count = verdict.count,
            limit = verdict.limit,
            "Rate limit exceeded"
        );
        let rejection = response::rejected(&identifier, &verdict);
        Box::pin(async move { Ok(rejection) })
    }
}
