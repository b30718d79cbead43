use std::time::Duration;

use crate::error::{Error, Result};

/// Longest accepted window. Keeps `now + window` far from `Instant` overflow.
pub const MAX_WINDOW_SIZE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Immutable limits applied to every client identifier.
///
/// A client is rejected once its count in the current window *exceeds*
/// `max_requests`; reaching it is still admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    window_size: Duration,
    max_requests: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_size: Duration::from_secs(1),
            max_requests: 5,
        }
    }
}

impl RateLimitConfig {
    pub fn new(window_size: Duration, max_requests: u64) -> Result<Self> {
        let config = Self {
            window_size,
            max_requests,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn window_size(&self) -> Duration {
        self.window_size
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    fn validate(&self) -> Result<()> {
        if self.window_size.is_zero() {
            return Err(Error::Configuration(
                "Window size must be greater than 0".to_string(),
            ));
        }
        if self.window_size > MAX_WINDOW_SIZE {
            return Err(Error::Configuration(format!(
                "Window size must be at most {}s",
                MAX_WINDOW_SIZE.as_secs()
            )));
        }
        if self.max_requests == 0 {
            return Err(Error::Configuration(
                "Max requests must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
