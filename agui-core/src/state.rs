//! Per-thread key/value state.
//!
//! Each thread owns a JSON object that clients update with partial
//! overlays. The store hands out copies only, so nothing outside it can
//! mutate a thread's state without going through [`ThreadStateStore::merge`]
//! or [`ThreadStateStore::set`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// A thread's state object.
pub type StateMap = Map<String, Value>;

struct ThreadEntry {
    state: StateMap,
    last_access: Instant,
}

/// In-memory state store keyed by thread ID.
///
/// All operations take one lock over the whole store, so concurrent merges
/// on the same thread serialize and never lose an update. None of the
/// operations fail: unknown threads read as empty state.
#[derive(Default)]
pub struct ThreadStateStore {
    threads: Mutex<HashMap<String, ThreadEntry>>,
}

impl ThreadStateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the thread's state, or an empty map if unknown.
    pub fn get(&self, thread_id: &str) -> StateMap {
        let mut threads = self.threads.lock();
        match threads.get_mut(thread_id) {
            Some(entry) => {
                entry.last_access = Instant::now();
                entry.state.clone()
            }
            None => StateMap::new(),
        }
    }

    /// Replace the thread's state wholesale.
    pub fn set(&self, thread_id: &str, state: StateMap) {
        self.threads.lock().insert(
            thread_id.to_string(),
            ThreadEntry {
                state,
                last_access: Instant::now(),
            },
        );
    }

    /// Overlay `incoming` onto the thread's state and return the result.
    ///
    /// Incoming keys replace existing ones; keys only on one side are kept.
    /// The overlay is shallow: nested objects are replaced, not merged.
    pub fn merge(&self, thread_id: &str, incoming: &StateMap) -> StateMap {
        let mut threads = self.threads.lock();
        let entry = threads
            .entry(thread_id.to_string())
            .or_insert_with(|| ThreadEntry {
                state: StateMap::new(),
                last_access: Instant::now(),
            });

        for (key, value) in incoming {
            entry.state.insert(key.clone(), value.clone());
        }
        entry.last_access = Instant::now();

        entry.state.clone()
    }

    /// Remove the thread's state.
    pub fn delete(&self, thread_id: &str) {
        self.threads.lock().remove(thread_id);
    }

    /// Evict threads not accessed within `max_age`. Returns how many were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut threads = self.threads.lock();
        let before = threads.len();
        threads.retain(|_, entry| now.duration_since(entry.last_access) <= max_age);
        before - threads.len()
    }

    /// Number of threads currently holding state.
    pub fn len(&self) -> usize {
        self.threads.lock().len()
    }

    /// True if no thread holds state.
    pub fn is_empty(&self) -> bool {
        self.threads.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
