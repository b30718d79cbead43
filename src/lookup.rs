//! Key-value lookup backends served behind the admission gate.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::info;

use crate::error::{Error, Result};

#[async_trait]
pub trait LookupBackend: Send + Sync {
    /// Value stored under `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// Redis-backed lookups over a single multiplexed connection.
#[derive(Clone)]
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    /// Open a connection and make sure the server answers before returning.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        let backend = Self { connection };
        backend.ping().await?;
        info!(target: "lookup_gate::lookup", redis_url, "Connected to Redis");
        Ok(backend)
    }
}

#[async_trait]
impl LookupBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        connection.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut connection = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut connection).await?;
        if reply != "PONG" {
            return Err(Error::Configuration(format!(
                "Unexpected PING reply from Redis: {reply}"
            )));
        }
        Ok(())
    }
}

/// In-process map, for tests and for running without Redis.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LookupBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Store `"1"` under each key so a fresh deployment has something to serve.
pub async fn seed(backend: &dyn LookupBackend, keys: &[String]) -> Result<()> {
    for key in keys {
        backend.set(key, "1").await?;
    }
    info!(target: "lookup_gate::lookup", count = keys.len(), "Seeded lookup keys");
    Ok(())
}
