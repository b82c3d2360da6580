//! Cache Statistics Module
//!
//! Tracks relay cache metrics including hits, misses, and auto-clears.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of requests answered from the cache
    pub hits: u64,
    /// Number of requests that had to go to the backend
    pub misses: u64,
    /// Number of inactivity evictions that removed entries
    pub auto_clears: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current aggregate size of keys and values in bytes
    pub total_bytes: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_auto_clear(&mut self) {
        self.auto_clears += 1;
    }

    // == Update Totals ==
    pub fn set_totals(&mut self, entries: usize, bytes: usize) {
        self.total_entries = entries;
        self.total_bytes = bytes;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.auto_clears, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::default();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_auto_clear() {
        let mut stats = CacheStats::default();
        stats.record_auto_clear();
        stats.record_auto_clear();
        assert_eq!(stats.auto_clears, 2);
    }

    #[test]
    fn test_set_totals() {
        let mut stats = CacheStats::default();
        stats.set_totals(3, 120);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_bytes, 120);
    }
}
