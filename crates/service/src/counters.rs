use std::sync::{Arc, Mutex, PoisonError};

use regdesk_core::constants::{REGISTRATIONS_KEY, VISITS_KEY};
use regdesk_storage::KeyValueStore;

use crate::ServiceError;
use crate::subject::{Subject, Subscription};

/// Visit and registration counters, each persisted under its own key.
pub struct CountersService {
    kv: Arc<dyn KeyValueStore>,
    visits: Subject<u64>,
    registrations: Subject<u64>,
    write_lock: Mutex<()>,
}

impl CountersService {
    /// Reads both counters; missing or non-numeric values start at zero.
    #[must_use]
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let visits = read_counter(kv.as_ref(), VISITS_KEY);
        let registrations = read_counter(kv.as_ref(), REGISTRATIONS_KEY);
        tracing::debug!(visits, registrations, "Counters loaded");
        Self {
            kv,
            visits: Subject::new(visits),
            registrations: Subject::new(registrations),
            write_lock: Mutex::new(()),
        }
    }

    pub fn visits(&self) -> u64 {
        self.visits.get()
    }

    pub fn registrations(&self) -> u64 {
        self.registrations.get()
    }

    pub fn subscribe_visits(&self) -> Subscription<u64> {
        self.visits.subscribe()
    }

    pub fn subscribe_registrations(&self) -> Subscription<u64> {
        self.registrations.subscribe()
    }

    /// Adds one visit; returns the new total.
    pub fn increment_visits(&self) -> Result<u64, ServiceError> {
        self.increment(VISITS_KEY, &self.visits)
    }

    /// Adds one registration; returns the new total.
    pub fn increment_registrations(&self) -> Result<u64, ServiceError> {
        self.increment(REGISTRATIONS_KEY, &self.registrations)
    }

    fn increment(&self, key: &str, counter: &Subject<u64>) -> Result<u64, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let next = counter.get().saturating_add(1);
        self.kv.set(key, &next.to_string())?;
        counter.publish(next);
        tracing::debug!(key, value = next, "Counter incremented");
        Ok(next)
    }
}

fn read_counter(kv: &dyn KeyValueStore, key: &str) -> u64 {
    match kv.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Counter is not a number, resetting to 0");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read counter, using 0");
            0
        },
    }
}
