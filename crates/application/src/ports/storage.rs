//! Key-value storage port

/// Port for the durable key-value storage backing the session store.
///
/// Operations are synchronous single calls: a read or write completes
/// before control returns to the scheduler, which is what makes the
/// session store torn-read free without any locking of its own.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str);
}
