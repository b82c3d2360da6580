//! API Module
//!
//! Admin HTTP API over the relay's control operations.
//!
//! # Endpoints
//! - `POST /server/start`, `POST /server/stop`, `GET /server/status`
//! - `PUT /config/backend` - Point cache misses at another backend
//! - `GET /cache/keys`, `GET /cache/entries` - List cached request lines
//! - `PUT /cache` - Add an entry, `DELETE /cache` - Clear everything
//! - `DELETE /cache/entries/:position` - Remove by 1-based position
//! - `GET /cache/search?key=` / `?fragment=` - Exact or substring search
//! - `POST /cache/eviction`, `GET /cache/eviction`, `POST /cache/eviction/run`
//! - `GET /stats`, `GET /events`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
