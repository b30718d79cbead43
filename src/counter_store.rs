use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Per-identifier request counts for the current window.
///
/// The whole map sits behind one mutex, so an increment and a reset can
/// never interleave. The lock is only held for the map operation itself and
/// never across an await point.
#[derive(Debug, Default)]
pub struct CounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for `identifier`, creating it at zero first if
    /// it has never been seen, and return the new value.
    pub fn increment_and_get(&self, identifier: &str) -> u64 {
        let mut counters = self.lock();
        // Avoid allocating a key for identifiers that are already tracked.
        if let Some(count) = counters.get_mut(identifier) {
            *count += 1;
            return *count;
        }
        counters.insert(identifier.to_string(), 1);
        1
    }

    /// Zero every tracked counter. Entries are kept, only their counts drop.
    pub fn reset_all(&self) {
        let mut counters = self.lock();
        for count in counters.values_mut() {
            *count = 0;
        }
    }

    /// Current count for `identifier`; unknown identifiers read as zero.
    pub fn count(&self, identifier: &str) -> u64 {
        self.lock().get(identifier).copied().unwrap_or(0)
    }

    /// Number of identifiers observed since the process started.
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the guard cannot leave a count half-written, so
    // a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
