//! Backend Client
//!
//! Forwards a request line to the fixed backend and reads its reply until the
//! backend closes the connection. There is no length framing: everything up
//! to EOF is the response. Invalid UTF-8 is decoded lossily.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ProxyError, Result};

/// Address of the upstream server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendTarget {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Builds the outbound request: the line verbatim, a `Host` header naming
/// the backend, `Connection: close`, and a blank line.
pub fn build_backend_request(request_line: &str, host: &str) -> String {
    format!(
        "{}\r\nHost: {}\r\nConnection: close\r\n\r\n",
        request_line, host
    )
}

/// Decodes a raw reply and re-terminates every line with a single `\n`.
fn normalize_reply(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut response = String::with_capacity(text.len());
    for line in text.lines() {
        response.push_str(line);
        response.push('\n');
    }
    response
}

// == Backend Client ==
/// Cloneable client for the backend. The target can be swapped at runtime;
/// forwards already in flight keep the target they started with.
#[derive(Debug, Clone)]
pub struct BackendClient {
    target: Arc<RwLock<BackendTarget>>,
}

impl BackendClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            target: Arc::new(RwLock::new(BackendTarget {
                host: host.into(),
                port,
            })),
        }
    }

    pub async fn target(&self) -> BackendTarget {
        self.target.read().await.clone()
    }

    pub async fn set_target(&self, target: BackendTarget) {
        *self.target.write().await = target;
    }

    // == Forward ==
    /// Sends `request_line` to the backend over a new connection and returns
    /// its reply, one `\n` after each line.
    ///
    /// Blocks the calling task for the whole round trip; there is no timeout.
    pub async fn forward(&self, request_line: &str) -> Result<String> {
        let target = self.target().await;
        let failure = |err: std::io::Error| {
            ProxyError::ConnectionFailure(format!("{}: {}", target, err))
        };

        let stream = TcpStream::connect((target.host.as_str(), target.port))
            .await
            .map_err(failure)?;
        debug!("Connected to backend {}", target);

        let (mut reader, mut writer) = stream.into_split();
        writer
            .write_all(build_backend_request(request_line, &target.host).as_bytes())
            .await
            .map_err(failure)?;
        writer.flush().await.map_err(failure)?;

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).await.map_err(failure)?;
        let response = normalize_reply(&raw);

        debug!("Backend {} replied with {} bytes", target, response.len());
        Ok(response)
    }
}
