//! Proxy Cache - A forward caching relay
//!
//! Answers one-line requests from a response cache, forwarding misses to a
//! fixed backend, and clears the whole cache after a size-dependent period
//! of inactivity.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod proxy;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{ProxyError, Result};
pub use events::{Event, EventLevel, EventLog, ReportSink, Reporter};
pub use service::ProxyService;
