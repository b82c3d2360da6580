//! Proxy Service
//!
//! The single service object owning the cache, the backend client and the
//! listener. Control surfaces (the admin API, tests, a future UI) call these
//! operations; every one of them reports through the configured sink.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{CacheStats, ListedEntry, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::events::{ReportSink, Reporter};
use crate::proxy::{BackendClient, BackendTarget, ConnectionContext, Listener, ListenerState};
use crate::tasks::{EvictionOutcome, PendingEviction};

/// Listener and backend status.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub state: ListenerState,
    pub local_addr: Option<SocketAddr>,
    pub backend: BackendTarget,
}

#[derive(Debug, Clone)]
pub struct ProxyService {
    cache: SharedCache,
    backend: BackendClient,
    listener: Listener,
    reporter: Reporter,
}

impl ProxyService {
    /// Builds the service from already-validated configuration.
    pub fn new(config: &Config, sink: Arc<dyn ReportSink>) -> Self {
        let reporter = Reporter::new(sink);
        let cache = SharedCache::new(reporter.clone());
        let backend = BackendClient::new(config.backend_host.clone(), config.backend_port);
        let listener = Listener::new(
            config.proxy_port,
            ConnectionContext {
                cache: cache.clone(),
                backend: backend.clone(),
                reporter: reporter.clone(),
            },
        );

        Self {
            cache,
            backend,
            listener,
            reporter,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Lifecycle ==
    pub async fn start(&self) -> Result<SocketAddr> {
        self.listener.start().await
    }

    pub async fn stop(&self) -> bool {
        self.listener.stop().await
    }

    pub async fn status(&self) -> ServerStatus {
        ServerStatus {
            state: self.listener.state().await,
            local_addr: self.listener.local_addr().await,
            backend: self.backend.target().await,
        }
    }

    /// Points subsequent cache misses at a different backend.
    pub async fn set_backend(&self, host: impl Into<String>, port: u16) -> BackendTarget {
        let target = BackendTarget {
            host: host.into(),
            port,
        };
        self.backend.set_target(target.clone()).await;
        self.reporter
            .info(format!("Backend updated: {}", target));
        target
    }

    // == Cache Control ==
    pub async fn list_keys(&self) -> Vec<String> {
        self.cache.list_keys().await
    }

    pub async fn list_entries(&self) -> Vec<ListedEntry> {
        self.cache.list_entries().await
    }

    pub async fn clear(&self) -> usize {
        self.cache.clear().await
    }

    pub async fn delete_at(&self, position: i64) -> Result<(String, String)> {
        self.cache.remove_at(position).await
    }

    pub async fn add(&self, key: impl Into<String>, value: impl Into<String>) {
        self.cache.add(key.into(), value.into()).await
    }

    pub async fn search_by_key(&self, key: &str) -> Option<String> {
        self.cache.search_by_key(key).await
    }

    pub async fn search_by_substring(&self, fragment: &str) -> Vec<String> {
        self.cache.search_by_substring(fragment).await
    }

    /// Re-arms the inactivity timer; `None` picks the delay from cache size.
    pub async fn schedule_eviction(&self, delay: Option<Duration>) -> Duration {
        self.cache.schedule_eviction(delay).await
    }

    pub async fn run_eviction_now(&self) -> EvictionOutcome {
        self.cache.run_eviction_now().await
    }

    pub async fn pending_eviction(&self) -> Option<PendingEviction> {
        self.cache.pending_eviction().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn service() -> (ProxyService, Arc<EventLog>) {
        let log = Arc::new(EventLog::new(100));
        let config = Config {
            proxy_port: 0,
            ..Config::default()
        };
        (ProxyService::new(&config, log.clone()), log)
    }

    #[tokio::test]
    async fn test_status_reflects_lifecycle() {
        let (service, _log) = service();
        assert_eq!(service.status().await.state, ListenerState::Stopped);

        let addr = service.start().await.unwrap();
        let status = service.status().await;
        assert_eq!(status.state, ListenerState::Running);
        assert_eq!(status.local_addr, Some(addr));

        service.stop().await;
        assert_eq!(service.status().await.state, ListenerState::Stopped);
    }

    #[tokio::test]
    async fn test_set_backend_reports_and_applies() {
        let (service, log) = service();
        service.set_backend("10.1.2.3", 8081).await;

        let status = service.status().await;
        assert_eq!(status.backend.host, "10.1.2.3");
        assert_eq!(status.backend.port, 8081);
        assert_eq!(log.messages(), vec!["Backend updated: 10.1.2.3:8081"]);
    }

    #[tokio::test]
    async fn test_control_operations_delegate_to_cache() {
        let (service, _log) = service();
        service.add("GET /a", "RESP_A").await;
        service.add("GET /b", "RESP_B").await;

        assert_eq!(service.list_keys().await, vec!["GET /a", "GET /b"]);
        assert_eq!(service.search_by_key("GET /b").await.as_deref(), Some("RESP_B"));
        assert!(service.delete_at(3).await.is_err());
        assert!(service.delete_at(2).await.is_ok());
        assert_eq!(service.clear().await, 1);
        assert_eq!(service.stats().await.total_entries, 0);
    }
}
