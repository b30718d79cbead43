//! Fixed-window admission control in front of a key lookup service.
//!
//! Every request is counted against its client identifier in a shared
//! [`CounterStore`]; the [`AdmissionGate`] rejects a client once its count in
//! the current window exceeds the configured maximum, and the
//! [`WindowScheduler`] zeroes all counters once per window. The
//! [`RequestPipeline`] ties these to any downstream tower service.

pub mod config;
pub mod counter_store;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod lookup;
pub mod middleware;
pub mod pipeline;
pub mod rate_limit_config;
pub mod rate_limiter;
pub mod response;
pub mod scheduler;
pub mod server;

pub use config::Config;
pub use counter_store::CounterStore;
pub use error::{Error, Result};
pub use identifier::IdentifierSource;
pub use pipeline::{RateLimitLayer, RequestPipeline};
pub use rate_limit_config::RateLimitConfig;
pub use rate_limiter::{AdmissionGate, Decision, Verdict};
pub use scheduler::{SchedulerState, WindowScheduler};
pub use server::create_app;
