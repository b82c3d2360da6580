//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::time::Duration;

use serde::Deserialize;

use crate::tasks::{describe_delay, EvictionUnit, MAX_EVICTION_DELAY};

/// Request body for adding an entry (PUT /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct AddRequest {
    /// The request line used as cache key
    pub key: String,
    /// The response text to store
    pub value: String,
}

impl AddRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.trim().is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.contains('\n') {
            return Some("Key must be a single request line".to_string());
        }
        None
    }
}

/// Request body for changing the backend (PUT /config/backend)
#[derive(Debug, Clone, Deserialize)]
pub struct BackendRequest {
    pub host: String,
    pub port: u16,
}

impl BackendRequest {
    pub fn validate(&self) -> Option<String> {
        if self.host.trim().is_empty() {
            return Some("Backend host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Some("Backend port must be between 1 and 65535".to_string());
        }
        None
    }
}

/// Request body for scheduling eviction (POST /cache/eviction)
///
/// Without `delay` the timer is armed from the current cache size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub delay: Option<u64>,
    #[serde(default)]
    pub unit: Option<EvictionUnit>,
}

impl ScheduleRequest {
    pub fn validate(&self) -> Option<String> {
        match self.delay() {
            Some(delay) if delay > MAX_EVICTION_DELAY => Some(format!(
                "Delay cannot exceed {}",
                describe_delay(MAX_EVICTION_DELAY)
            )),
            _ => None,
        }
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
            .map(|amount| self.unit.unwrap_or_default().duration(amount))
    }
}

/// Query string for GET /cache/search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Exact request line
    pub key: Option<String>,
    /// Substring of request lines
    pub fragment: Option<String>,
}
