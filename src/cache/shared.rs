//! Shared Cache Module
//!
//! Concurrent handle pairing the [`CacheStore`] with its [`EvictionScheduler`].
//! Every store operation and the timer re-arm it causes run under one lock.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, CacheStore, ListedEntry};
use crate::error::{ProxyError, Result};
use crate::events::Reporter;
use crate::tasks::{
    delay_for_size, describe_delay, evict, EvictionOutcome, EvictionScheduler, PendingEviction,
    MAX_EVICTION_DELAY,
};

#[derive(Debug, Default)]
struct CacheState {
    store: CacheStore,
    scheduler: EvictionScheduler,
}

// == Shared Cache ==
/// Thread-safe cache shared by every connection handler and the control layer.
///
/// Any operation that inspects or mutates the store counts as activity and
/// re-arms the inactivity timer, reads included.
#[derive(Debug, Clone)]
pub struct SharedCache {
    state: Arc<Mutex<CacheState>>,
    reporter: Reporter,
}

impl SharedCache {
    pub fn new(reporter: Reporter) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            reporter,
        }
    }

    // == Request Path ==
    /// Looks up a cached response, counting a hit or a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().await;
        let value = state.store.get(key);
        self.rearm(&mut state);
        value
    }

    /// Stores a response without reporting, returning the previous value.
    pub async fn put(&self, key: String, value: String) -> Option<String> {
        let mut state = self.state.lock().await;
        let previous = state.store.put(key, value);
        self.rearm(&mut state);
        previous
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        let found = state.store.contains_key(key);
        self.rearm(&mut state);
        found
    }

    /// Aggregate byte size of keys and values.
    pub async fn size(&self) -> usize {
        let mut state = self.state.lock().await;
        let size = state.store.size_bytes();
        self.rearm(&mut state);
        size
    }

    pub async fn len(&self) -> usize {
        let mut state = self.state.lock().await;
        let len = state.store.len();
        self.rearm(&mut state);
        len
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All key/value pairs in listing order.
    pub async fn snapshot(&self) -> Vec<(String, String)> {
        let mut state = self.state.lock().await;
        let pairs = state.store.snapshot();
        self.rearm(&mut state);
        pairs
    }

    // == Control Operations ==
    pub async fn add(&self, key: String, value: String) {
        let mut state = self.state.lock().await;
        self.reporter
            .info(format!("Added to cache: {} -> {}", key, value));
        state.store.put(key, value);
        self.rearm(&mut state);
    }

    pub async fn list_keys(&self) -> Vec<String> {
        let mut state = self.state.lock().await;
        let keys = state.store.keys();
        if keys.is_empty() {
            self.reporter.info("Cache is empty.");
        } else {
            self.reporter.info("Keys in cache:");
            for key in &keys {
                self.reporter.info(key.as_str());
            }
        }
        self.rearm(&mut state);
        keys
    }

    pub async fn list_entries(&self) -> Vec<ListedEntry> {
        let mut state = self.state.lock().await;
        let entries = state.store.entries();
        if entries.is_empty() {
            self.reporter.info("Cache is empty.");
        } else {
            self.reporter.info("Cache contents:");
            for entry in &entries {
                self.reporter.info(entry.to_string());
            }
        }
        self.rearm(&mut state);
        entries
    }

    /// Removes the entry at a 1-based listing position.
    pub async fn remove_at(&self, position: i64) -> Result<(String, String)> {
        let mut state = self.state.lock().await;
        let result = state.store.remove_at(position);
        match &result {
            Ok((key, _)) => self.reporter.info(format!("Entry removed: {}", key)),
            Err(ProxyError::InvalidIndex { count, .. }) => self.reporter.warn(format!(
                "Invalid index. Please enter an index between 1 and {}",
                count
            )),
            Err(err) => self.reporter.error(err.to_string()),
        }
        self.rearm(&mut state);
        result
    }

    /// Removes every entry, returning how many were removed.
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.store.clear();
        self.reporter.info("Cache cleared!");
        self.rearm(&mut state);
        removed
    }

    pub async fn search_by_key(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().await;
        let found = state.store.peek(key).map(str::to_string);
        match &found {
            Some(value) => self.reporter.info(format!("Found: {} -> {}", key, value)),
            None => self
                .reporter
                .info(format!("Key {} not found in cache.", key)),
        }
        self.rearm(&mut state);
        found
    }

    /// Returns every key containing `fragment`, reporting one event per hit.
    pub async fn search_by_substring(&self, fragment: &str) -> Vec<String> {
        let mut state = self.state.lock().await;
        let matches = state.store.search(fragment);
        if matches.is_empty() {
            self.reporter
                .info(format!("Key {} not found in cache.", fragment));
        } else {
            for key in &matches {
                self.reporter.info(format!("Found: {} -> {}", fragment, key));
            }
        }
        self.rearm(&mut state);
        matches
    }

    // == Eviction ==
    /// Re-arms the timer from the current size, or with an explicit delay
    /// that bypasses size-based selection. Returns the delay armed, which is
    /// never longer than [`MAX_EVICTION_DELAY`].
    pub async fn schedule_eviction(&self, delay: Option<Duration>) -> Duration {
        let mut state = self.state.lock().await;
        let delay = delay
            .unwrap_or_else(|| delay_for_size(state.store.size_bytes()))
            .min(MAX_EVICTION_DELAY);
        self.arm(&mut state, delay);
        self.reporter
            .info(format!("Auto-clear scheduled in {}", describe_delay(delay)));
        delay
    }

    /// Cancels any pending timer and applies the firing rule now.
    ///
    /// Like a timer firing, this leaves the scheduler dormant.
    pub async fn run_eviction_now(&self) -> EvictionOutcome {
        let mut state = self.state.lock().await;
        state.scheduler.cancel();
        let outcome = evict(&mut state.store);
        self.reporter.info(outcome.message());
        outcome
    }

    /// The armed timer, if any. Does not count as activity.
    pub async fn pending_eviction(&self) -> Option<PendingEviction> {
        self.state.lock().await.scheduler.pending()
    }

    /// Statistics snapshot. Does not count as activity.
    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.store.stats()
    }

    fn rearm(&self, state: &mut CacheState) {
        let delay = delay_for_size(state.store.size_bytes());
        self.arm(state, delay);
    }

    fn arm(&self, state: &mut CacheState, delay: Duration) {
        let weak: Weak<Mutex<CacheState>> = Arc::downgrade(&self.state);
        let reporter = self.reporter.clone();

        state.scheduler.arm(delay, move |generation| async move {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut state = shared.lock().await;
            if !state.scheduler.take_fired(generation) {
                return;
            }
            let outcome = evict(&mut state.store);
            reporter.info(outcome.message());
        });
    }
}
