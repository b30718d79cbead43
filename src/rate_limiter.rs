use std::sync::Arc;

use crate::counter_store::CounterStore;
use crate::rate_limit_config::RateLimitConfig;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Reject,
}

/// A decision together with the count that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub count: u64,
    pub limit: u64,
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        self.decision == Decision::Admit
    }

    /// Requests still admitted for this identifier before the next reset.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }
}

/// Turns per-identifier counts into admit/reject decisions.
///
/// Every check consumes a slot in the current window, including rejected
/// ones: a client that keeps retrying past the limit keeps counting until the
/// window resets.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    store: Arc<CounterStore>,
    config: RateLimitConfig,
}

impl AdmissionGate {
    pub fn new(store: Arc<CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn check(&self, identifier: &str) -> Decision {
        self.evaluate(identifier).decision
    }

    pub fn evaluate(&self, identifier: &str) -> Verdict {
        let count = self.store.increment_and_get(identifier);
        let limit = self.config.max_requests();
        let decision = if count > limit {
            Decision::Reject
        } else {
            Decision::Admit
        };

        Verdict {
            decision,
            count,
            limit,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<CounterStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate(max_requests: u64) -> AdmissionGate {
        let config = RateLimitConfig::new(Duration::from_secs(1), max_requests).unwrap();
        AdmissionGate::new(Arc::new(CounterStore::new()), config)
    }

    #[test]
    fn test_boundary_five_admitted_sixth_rejected() {
        let gate = gate(5);
        for _ in 0..5 {
            assert_eq!(gate.check("alice"), Decision::Admit);
        }
        assert_eq!(gate.check("alice"), Decision::Reject);

        gate.store().reset_all();
        assert_eq!(gate.check("alice"), Decision::Admit);
    }

    #[test]
    fn test_first_reject_is_call_after_limit() {
        for max in 1..=8 {
            let gate = gate(max);
            let first_reject = (1..=max + 3)
                .find(|_| gate.check("k") == Decision::Reject)
                .unwrap();
            assert_eq!(first_reject, max + 1);
        }
    }

    #[test]
    fn test_rejected_checks_still_count() {
        let gate = gate(2);
        for _ in 0..5 {
            gate.check("flood");
        }
        assert_eq!(gate.store().count("flood"), 5);

        let verdict = gate.evaluate("flood");
        assert_eq!(verdict.count, 6);
        assert_eq!(verdict.remaining(), 0);
        assert!(!verdict.is_admitted());
    }

    #[test]
    fn test_check_does_not_touch_other_identifiers() {
        let gate = gate(1);
        assert_eq!(gate.check("alice"), Decision::Admit);
        assert_eq!(gate.check("alice"), Decision::Reject);
        assert_eq!(gate.check("bob"), Decision::Admit);
        assert_eq!(gate.store().count("bob"), 1);
    }

    #[test]
    fn test_interleaved_identifiers_within_limit() {
        let gate = gate(5);
        for _ in 0..5 {
            assert_eq!(gate.check("alice"), Decision::Admit);
            assert_eq!(gate.check("bob"), Decision::Admit);
        }
    }

    #[test]
    fn test_verdict_reports_remaining_quota() {
        let gate = gate(3);
        assert_eq!(gate.evaluate("alice").remaining(), 2);
        assert_eq!(gate.evaluate("alice").remaining(), 1);
        assert_eq!(gate.evaluate("alice").remaining(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_checks_reject_exactly_the_overflow() {
        let gate = Arc::new(gate(5));
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.evaluate("burst") })
            })
            .collect();

        let mut verdicts = Vec::new();
        for handle in handles {
            verdicts.push(handle.await.unwrap());
        }

        let rejected = verdicts.iter().filter(|v| !v.is_admitted()).count();
        assert_eq!(rejected, 45);

        let mut counts: Vec<u64> = verdicts.iter().map(|v| v.count).collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=50).collect::<Vec<_>>());
    }
}
