//! Background Tasks Module
//!
//! Contains the timer tasks that run alongside the relay.
//!
//! # Tasks
//! - Inactivity eviction: clears the whole cache after a size-dependent idle period

mod eviction;

pub use eviction::{
    delay_for_size, describe_delay, evict, EvictionOutcome, EvictionScheduler, EvictionUnit,
    PendingEviction, LARGE_CACHE_DELAY, MAX_EVICTION_DELAY, SIZE_THRESHOLD, SMALL_CACHE_DELAY,
};
