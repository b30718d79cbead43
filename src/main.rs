use anyhow::{Context, Result};
use lookup_gate::config::Config;
use lookup_gate::lookup::{seed, RedisBackend};
use lookup_gate::server::Server;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lookup_gate={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting lookup-gate {}", env!("CARGO_PKG_VERSION"));

    let backend = RedisBackend::connect(&config.redis_url())
        .await
        .with_context(|| format!("Failed to connect to redis at {}", config.redis_address))?;
    seed(&backend, &config.seed_keys)
        .await
        .context("Failed to seed redis")?;
    tracing::info!("Connected to redis at: {}", config.redis_address);

    let server = Server::new(&config, Arc::new(backend)).context("Failed to create server")?;
    server.run().await.context("Server error")?;

    Ok(())
}
