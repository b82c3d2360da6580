//! Configuration Module
//!
//! Handles loading and managing relay configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Relay configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Client-facing listen port
    pub proxy_port: u16,
    /// Backend host, also sent as the `Host` header
    pub backend_host: String,
    /// Backend port
    pub backend_port: u16,
    /// Admin HTTP API port
    pub admin_port: u16,
    /// Number of status events retained in memory
    pub event_log_capacity: usize,
    /// Start the listener on boot
    pub auto_start: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_PORT` - Client-facing port (default: 8080)
    /// - `BACKEND_HOST` - Backend host (default: 127.0.0.1)
    /// - `BACKEND_PORT` - Backend port (default: 80)
    /// - `ADMIN_PORT` - Admin API port (default: 3000)
    /// - `EVENT_LOG_CAPACITY` - Retained events (default: 1000)
    /// - `AUTO_START` - Start listening on boot (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            proxy_port: env_or("PROXY_PORT", defaults.proxy_port),
            backend_host: env::var("BACKEND_HOST")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.backend_host),
            backend_port: env_or("BACKEND_PORT", defaults.backend_port),
            admin_port: env_or("ADMIN_PORT", defaults.admin_port),
            event_log_capacity: env_or("EVENT_LOG_CAPACITY", defaults.event_log_capacity),
            auto_start: env_or("AUTO_START", defaults.auto_start),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_port: 8080,
            backend_host: "127.0.0.1".to_string(),
            backend_port: 80,
            admin_port: 3000,
            event_log_capacity: 1000,
            auto_start: true,
        }
    }
}
