use crate::config::Config;
use crate::counter_store::CounterStore;
use crate::error::Result;
use crate::handlers::{health_check, lookup, AppState};
use crate::identifier::IdentifierSource;
use crate::lookup::LookupBackend;
use crate::middleware::logging_middleware;
use crate::pipeline::RateLimitLayer;
use crate::rate_limiter::AdmissionGate;
use crate::scheduler::WindowScheduler;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the router: `/` is the rate-limited lookup, `/health` is not limited.
pub fn create_app(
    gate: Arc<AdmissionGate>,
    source: IdentifierSource,
    backend: Arc<dyn LookupBackend>,
) -> Router {
    let state = AppState {
        backend,
        gate: Arc::clone(&gate),
        source: Arc::new(source.clone()),
    };

    let limited = Router::new()
        .route("/", get(lookup))
        .layer(RateLimitLayer::new(gate, source))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .merge(limited)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    app: Router,
    addr: SocketAddr,
    store: Arc<CounterStore>,
    gate: Arc<AdmissionGate>,
}

impl Server {
    pub fn new(config: &Config, backend: Arc<dyn LookupBackend>) -> Result<Self> {
        let store = Arc::new(CounterStore::new());
        let gate = Arc::new(AdmissionGate::new(Arc::clone(&store), config.rate_limit()?));
        let app = create_app(Arc::clone(&gate), config.identifier_source(), backend);

        Ok(Self {
            app,
            addr: config.bind_addr(),
            store,
            gate,
        })
    }

    pub async fn run(self) -> Result<()> {
        let scheduler = WindowScheduler::start(Arc::clone(&self.store), self.gate.config());

        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        tracing::info!("Listening at         : {}", self.addr);
        tracing::info!("Window time          : {:?}", scheduler.window());
        tracing::info!("Max Request          : {}", self.gate.config().max_requests());
        tracing::info!("Health check available at /health");

        // Run server with graceful shutdown
        let served = axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        scheduler.stop().await;
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
