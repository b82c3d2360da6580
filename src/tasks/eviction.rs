//! Inactivity Eviction
//!
//! One cancellable one-shot timer per cache. Every touch re-arms it with a
//! delay chosen from the current cache size; when it fires, the whole cache
//! is cleared and the scheduler goes dormant until the next touch.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::CacheStore;

// == Constants ==
/// Caches above this many bytes use the shorter [`LARGE_CACHE_DELAY`].
pub const SIZE_THRESHOLD: usize = 100 * 1024;

/// Idle time before a large cache is cleared.
pub const LARGE_CACHE_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Idle time before a light cache is cleared.
pub const SMALL_CACHE_DELAY: Duration = Duration::from_secs(72 * 60 * 60);

/// Longest delay a timer can be armed with. Longer requests are clamped.
pub const MAX_EVICTION_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Selects the inactivity delay for a cache of `size_bytes`.
pub fn delay_for_size(size_bytes: usize) -> Duration {
    if size_bytes > SIZE_THRESHOLD {
        LARGE_CACHE_DELAY
    } else {
        SMALL_CACHE_DELAY
    }
}

/// Renders a delay as a short human-readable phrase ("24 hours", "90 seconds").
///
/// Whole hours are used up to [`SMALL_CACHE_DELAY`] and whole days above it.
pub fn describe_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    let (amount, unit) = if delay > SMALL_CACHE_DELAY && secs % 86_400 == 0 {
        (secs / 86_400, "day")
    } else if secs != 0 && secs % 3_600 == 0 {
        (secs / 3_600, "hour")
    } else if secs != 0 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else if delay.subsec_millis() != 0 || secs == 0 {
        return format!("{} milliseconds", delay.as_millis());
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}

// == Eviction Unit ==
/// Time unit for an explicitly requested eviction delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionUnit {
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl EvictionUnit {
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            EvictionUnit::Milliseconds => Duration::from_millis(amount),
            EvictionUnit::Seconds => Duration::from_secs(amount),
            EvictionUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            EvictionUnit::Hours => Duration::from_secs(amount.saturating_mul(3_600)),
            EvictionUnit::Days => Duration::from_secs(amount.saturating_mul(86_400)),
        }
    }
}

// == Eviction Outcome ==
/// What a firing eviction did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionOutcome {
    /// Cache was above the threshold and has been cleared
    LargeCleared { entries: usize, bytes: usize },
    /// Cache was non-empty and below the threshold and has been cleared
    LightCleared { entries: usize, bytes: usize },
    /// Nothing to remove
    AlreadyEmpty,
}

impl EvictionOutcome {
    pub fn message(&self) -> String {
        match self {
            EvictionOutcome::LargeCleared { .. } => format!(
                "Large cache auto-cleared after {} of inactivity!",
                describe_delay(LARGE_CACHE_DELAY)
            ),
            EvictionOutcome::LightCleared { .. } => format!(
                "Light cache auto-cleared after {} of inactivity!",
                describe_delay(SMALL_CACHE_DELAY)
            ),
            EvictionOutcome::AlreadyEmpty => {
                "Cache already empty, no removal needed.".to_string()
            }
        }
    }
}

/// Applies the firing rule to `store`: re-evaluate its size, then clear it
/// if there is anything to clear.
pub fn evict(store: &mut CacheStore) -> EvictionOutcome {
    let bytes = store.size_bytes();
    if store.is_empty() {
        return EvictionOutcome::AlreadyEmpty;
    }

    let entries = store.clear();
    store.record_auto_clear();
    if bytes > SIZE_THRESHOLD {
        EvictionOutcome::LargeCleared { entries, bytes }
    } else {
        EvictionOutcome::LightCleared { entries, bytes }
    }
}

// == Scheduler ==
/// Snapshot of the armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEviction {
    /// Delay the timer was armed with
    pub delay: Duration,
    /// Time left before it fires
    pub remaining: Duration,
}

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    delay: Duration,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Owns at most one pending eviction timer.
///
/// Callers keep the scheduler under the same lock as the store it evicts so
/// that a mutation and its re-arm happen as one step.
#[derive(Debug, Default)]
pub struct EvictionScheduler {
    armed: Option<ArmedTimer>,
    generation: u64,
}

impl EvictionScheduler {
    // == Arm ==
    /// Cancels any pending timer and spawns a new one that calls `on_fire`
    /// with its generation after `delay`, clamped to [`MAX_EVICTION_DELAY`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F, Fut>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let delay = delay.min(MAX_EVICTION_DELAY);
        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or(now);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(generation).await;
        });

        debug!(
            "Eviction timer #{} armed for {}",
            generation,
            describe_delay(delay)
        );
        self.armed = Some(ArmedTimer {
            generation,
            delay,
            deadline,
            handle,
        });
        generation
    }

    // == Cancel ==
    /// Aborts the pending timer, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.armed.take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    // == Fired ==
    /// Claims a firing timer. Returns false if `generation` has been
    /// superseded or cancelled since it was armed, in which case the caller
    /// must not evict.
    pub fn take_fired(&mut self, generation: u64) -> bool {
        let current = self.armed.as_ref().map(|timer| timer.generation) == Some(generation);
        if current {
            // The task is the caller; dropping the handle detaches it.
            self.armed = None;
        }
        current
    }

    // == Pending ==
    pub fn pending(&self) -> Option<PendingEviction> {
        self.armed.as_ref().map(|timer| PendingEviction {
            delay: timer.delay,
            remaining: timer.deadline.saturating_duration_since(Instant::now()),
        })
    }
}

impl Drop for EvictionScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
