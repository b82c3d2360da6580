//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, ListedEntry};
use crate::tasks::PendingEviction;

/// Generic acknowledgement carrying the status message that was reported
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /cache/keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Response body for GET /cache/entries
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<ListedEntry>,
    /// Display lines, e.g. "1. GET /a"
    pub lines: Vec<String>,
}

impl EntriesResponse {
    pub fn new(entries: Vec<ListedEntry>) -> Self {
        let lines = entries.iter().map(ToString::to_string).collect();
        Self { entries, lines }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Response body for DELETE /cache/entries/:position
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Entry removed: {}", key),
            key,
        }
    }
}

/// One search match
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Response body for GET /cache/search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub hits: usize,
    pub matches: Vec<SearchHit>,
}

impl SearchResponse {
    pub fn new(matches: Vec<SearchHit>) -> Self {
        Self {
            hits: matches.len(),
            matches,
        }
    }
}

/// Response body for the eviction endpoints
#[derive(Debug, Clone, Serialize)]
pub struct EvictionStatusResponse {
    pub armed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
}

impl From<Option<PendingEviction>> for EvictionStatusResponse {
    fn from(pending: Option<PendingEviction>) -> Self {
        Self {
            armed: pending.is_some(),
            delay_secs: pending.map(|p| p.delay.as_secs()),
            remaining_secs: pending.map(|p| p.remaining.as_secs()),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub auto_clears: u64,
    pub total_entries: usize,
    pub total_bytes: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            auto_clears: stats.auto_clears,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_entries_response_lines() {
        let resp = EntriesResponse::new(vec![
            ListedEntry {
                position: 1,
                key: "GET /a".to_string(),
            },
            ListedEntry {
                position: 2,
                key: "GET /b".to_string(),
            },
        ]);
        assert_eq!(resp.lines, vec!["1. GET /a", "2. GET /b"]);
    }

    #[test]
    fn test_search_response_counts_hits() {
        let resp = SearchResponse::new(vec![SearchHit {
            key: "GET /ab".to_string(),
            value: None,
        }]);
        assert_eq!(resp.hits, 1);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("value"));
    }

    #[test]
    fn test_eviction_status_from_pending() {
        let resp = EvictionStatusResponse::from(Some(PendingEviction {
            delay: Duration::from_secs(72 * 3600),
            remaining: Duration::from_secs(100),
        }));
        assert!(resp.armed);
        assert_eq!(resp.delay_secs, Some(259_200));
        assert_eq!(resp.remaining_secs, Some(100));

        let resp = EvictionStatusResponse::from(None);
        assert!(!resp.armed);
        assert!(resp.delay_secs.is_none());
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
