//! In-memory port implementations for tests.
//!
//! These fakes let the session core run without a real storage backend,
//! wall clock, or front end. They live in the library (rather than a
//! test-only module) so integration tests and downstream crates can reuse
//! them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};

use crate::ports::{Clock, KeyValueStorage, Navigator};

/// `KeyValueStorage` backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[allow(clippy::unwrap_used)]
impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// `Clock` returning a programmable instant.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Creates a clock frozen at the given instant.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to a new instant.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[allow(clippy::unwrap_used)]
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Advances the clock by whole seconds.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[allow(clippy::unwrap_used)]
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

#[allow(clippy::unwrap_used)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// `Navigator` that counts invocations instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    /// Creates a navigator with zero recorded redirects.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            redirects: AtomicUsize::new(0),
        }
    }

    /// Number of times `to_login` was invoked.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
