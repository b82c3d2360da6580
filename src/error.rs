//! Error types for the caching relay
//!
//! Provides unified error handling using thiserror.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Proxy Error Enum ==
/// Unified error type for the caching relay.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The accepting socket could not be opened
    #[error("Failed to bind port {port}: {source}")]
    BindFailure {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Backend unreachable or I/O error while forwarding
    #[error("Backend connection failed: {0}")]
    ConnectionFailure(String),

    /// Deletion position outside `1..=count`
    #[error("Invalid index {position}. Please enter an index between 1 and {count}")]
    InvalidIndex { position: i64, count: usize },

    /// Read/write error on a client connection
    #[error("Client I/O error: {0}")]
    ClientIo(#[from] io::Error),

    /// Malformed admin request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::InvalidIndex { .. } | ProxyError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::ConnectionFailure(_) => StatusCode::BAD_GATEWAY,
            ProxyError::BindFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::ClientIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching relay.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index_cites_range() {
        let err = ProxyError::InvalidIndex {
            position: 5,
            count: 2,
        };
        assert!(err.to_string().contains("between 1 and 2"));
    }

    #[test]
    fn test_status_codes() {
        let resp = ProxyError::InvalidIndex {
            position: 0,
            count: 0,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ProxyError::ConnectionFailure("refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
