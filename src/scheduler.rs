//! Global fixed-window clock.
//!
//! One background task zeroes every counter once per window. Boundaries are
//! shared by all identifiers and are not aligned to any client's first
//! request, so a client's effective window can be anywhere between just over
//! zero and just under the configured size.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::counter_store::CounterStore;
use crate::rate_limit_config::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

pub struct WindowScheduler {
    handle: JoinHandle<()>,
    window: Duration,
}

impl WindowScheduler {
    /// Spawn the reset task on the current tokio runtime.
    ///
    /// The first reset happens one full window after this call. The window
    /// comes from a validated [`RateLimitConfig`], so the first deadline
    /// always fits in an `Instant`.
    pub fn start(store: Arc<CounterStore>, config: &RateLimitConfig) -> Self {
        let window = config.window_size();
        let mut ticker = time::interval_at(Instant::now() + window, window);
        // A late tick is dropped rather than replayed as a burst of resets.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handle = tokio::spawn(async move {
            loop {
                ticker.tick().await;
                store.reset_all();
                debug!(
                    target: "lookup_gate::scheduler",
                    tracked = store.tracked(),
                    "Window reset"
                );
            }
        });

        Self { handle, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> SchedulerState {
        if self.handle.is_finished() {
            SchedulerState::Stopped
        } else {
            SchedulerState::Running
        }
    }

    /// Cancel the reset task and wait for it to wind down.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        debug!(target: "lookup_gate::scheduler", "Window scheduler stopped");
    }
}
