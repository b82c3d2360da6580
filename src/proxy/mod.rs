//! Proxy Module
//!
//! Client-facing relay: accept a connection, read one request line, answer
//! from the cache or forward to the backend.
//!
//! # Components
//! - `BackendClient` - one fresh outbound connection per cache miss
//! - `handle_connection` - per-connection request handling
//! - `Listener` - accept loop with start/stop lifecycle

mod backend;
mod handler;
mod listener;

pub use backend::{build_backend_request, BackendClient, BackendTarget};
pub use handler::{
    handle_connection, respond, ConnectionContext, MAX_REQUEST_LINE, NOT_FOUND_RESPONSE,
};
pub use listener::{Listener, ListenerState};
