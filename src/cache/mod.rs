//! Cache Module
//!
//! Response cache keyed by raw request line, with whole-cache inactivity eviction.

mod order;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use order::InsertionOrder;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::{CacheStore, ListedEntry};
