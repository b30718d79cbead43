use axum::http::HeaderName;
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::identifier::IdentifierSource;
use crate::rate_limit_config::RateLimitConfig;

/// Process configuration, read once at startup from flags or the environment.
#[derive(Debug, Clone, Parser, Validate)]
#[command(name = "lookup-gate", version, about)]
pub struct Config {
    /// The redis address where we want to get the value from
    #[arg(long, env = "REDIS_ADDRESS", default_value = "localhost:6379")]
    #[validate(custom(function = "validate_redis_address"))]
    pub redis_address: String,

    /// The rate limit window size (in seconds, at most one year)
    #[arg(long = "window-size", env = "WINDOW_SIZE", default_value_t = 1)]
    #[validate(range(min = 1, max = 31_536_000))]
    pub window_size_secs: u64,

    /// The rate limit max requests within the window
    #[arg(long = "max-request", env = "MAX_REQUEST", default_value_t = 5)]
    #[validate(range(min = 1))]
    pub max_requests: u64,

    /// The port to listen and serve on
    #[arg(long, env = "SERVER_PORT", default_value_t = 8000)]
    #[validate(range(min = 1))]
    pub server_port: u16,

    /// Query parameter carrying the client identifier
    #[arg(long, env = "IDENTIFIER_PARAM", default_value = "id")]
    #[validate(length(min = 1))]
    pub identifier_param: String,

    /// Read the client identifier from this header instead of the query string
    #[arg(long, env = "IDENTIFIER_HEADER")]
    #[validate(custom(function = "validate_identifier_header"))]
    pub identifier_header: Option<String>,

    /// Keys stored with value 1 at startup
    #[arg(long, env = "SEED_KEYS", value_delimiter = ',', default_value = "asd,asdf")]
    pub seed_keys: Vec<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse the process arguments and environment, then validate.
    pub fn load() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`] but from an explicit argument list.
    pub fn try_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config =
            Self::try_parse_from(args).map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn rate_limit(&self) -> Result<RateLimitConfig> {
        RateLimitConfig::new(Duration::from_secs(self.window_size_secs), self.max_requests)
    }

    pub fn identifier_source(&self) -> IdentifierSource {
        match &self.identifier_header {
            Some(header) => IdentifierSource::Header(header.to_ascii_lowercase()),
            None => IdentifierSource::Query(self.identifier_param.clone()),
        }
    }

    /// Redis connection URL; a bare `host:port` gets the `redis://` scheme.
    pub fn redis_url(&self) -> String {
        if self.redis_address.contains("://") {
            self.redis_address.clone()
        } else {
            format!("redis://{}", self.redis_address)
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.server_port))
    }
}

fn validate_redis_address(address: &str) -> std::result::Result<(), ValidationError> {
    if address.is_empty() {
        return Err(ValidationError::new("empty_redis_address"));
    }
    if address.contains("://")
        && !address.starts_with("redis://")
        && !address.starts_with("rediss://")
    {
        return Err(ValidationError::new("unsupported_redis_scheme"));
    }
    Ok(())
}

fn validate_identifier_header(header: &str) -> std::result::Result<(), ValidationError> {
    HeaderName::from_bytes(header.as_bytes())
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_identifier_header"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit_config::MAX_WINDOW_SIZE;

    #[test]
    fn test_defaults() {
        let config = Config::try_from_args(["lookup-gate"]).unwrap();
        assert_eq!(config.redis_url(), "redis://localhost:6379");
        assert_eq!(config.bind_addr().port(), 8000);
        assert_eq!(config.seed_keys, vec!["asd", "asdf"]);
        assert_eq!(config.identifier_source(), IdentifierSource::default());

        let limits = config.rate_limit().unwrap();
        assert_eq!(limits.window_size(), Duration::from_secs(1));
        assert_eq!(limits.max_requests(), 5);
    }

    #[test]
    fn test_flag_overrides() {
        let config = Config::try_from_args([
            "lookup-gate",
            "--window-size",
            "10",
            "--max-request",
            "100",
            "--server-port",
            "9000",
            "--redis-address",
            "rediss://cache.internal:6380",
            "--seed-keys",
            "a,b,c",
        ])
        .unwrap();

        assert_eq!(config.window_size_secs, 10);
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.redis_url(), "rediss://cache.internal:6380");
        assert_eq!(config.seed_keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let result = Config::try_from_args(["lookup-gate", "--window-size", "0"]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_max_request_is_rejected() {
        let result = Config::try_from_args(["lookup-gate", "--max-request", "0"]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_unsupported_redis_scheme_is_rejected() {
        let result =
            Config::try_from_args(["lookup-gate", "--redis-address", "http://localhost:6379"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_flag_is_configuration_error() {
        let result = Config::try_from_args(["lookup-gate", "--max-request", "many"]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_header_identifier_source() {
        let config =
            Config::try_from_args(["lookup-gate", "--identifier-header", "X-Client-Id"]).unwrap();
        assert_eq!(
            config.identifier_source(),
            IdentifierSource::Header("x-client-id".to_string())
        );
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let result = Config::try_from_args(["lookup-gate", "--window-size", "18446744073709551615"]);
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = Config::try_from_args(["lookup-gate", "--window-size", "31536001"]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_longest_window_is_accepted() {
        let window = MAX_WINDOW_SIZE.as_secs().to_string();
        let config = Config::try_from_args(["lookup-gate", "--window-size", window.as_str()]).unwrap();
        assert_eq!(config.rate_limit().unwrap().window_size(), MAX_WINDOW_SIZE);
    }

    #[test]
    fn test_invalid_identifier_header_is_rejected() {
        let result = Config::try_from_args(["lookup-gate", "--identifier-header", "bad header"]);
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = Config::try_from_args(["lookup-gate", "--identifier-header", ""]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
