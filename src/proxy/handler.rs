//! Connection Handler
//!
//! Reads exactly one request line, answers it, and closes the connection.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::cache::SharedCache;
use crate::error::{ProxyError, Result};
use crate::events::Reporter;
use crate::proxy::BackendClient;

/// Sent when the backend cannot be reached. Never cached.
pub const NOT_FOUND_RESPONSE: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Type: text/html; charset=UTF-8\r\n\r\nPage not found";

/// Longest request line accepted, terminator included.
pub const MAX_REQUEST_LINE: usize = 8 * 1024;

/// Everything a connection handler needs, cloned into each connection task.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub cache: SharedCache,
    pub backend: BackendClient,
    pub reporter: Reporter,
}

/// Serves one accepted connection. Errors are reported and contained to
/// this connection, which is closed only after the report.
pub async fn handle_connection(mut stream: TcpStream, context: ConnectionContext) {
    if let Err(err) = serve(&mut stream, &context).await {
        context
            .reporter
            .error(format!("Client connection error: {}", err));
    }
}

async fn serve(stream: &mut TcpStream, context: &ConnectionContext) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_LINE as u64));

    let mut raw = Vec::new();
    let read = reader.read_until(b'\n', &mut raw).await?;
    if read == MAX_REQUEST_LINE && !raw.ends_with(b"\n") {
        return Err(ProxyError::InvalidRequest(format!(
            "request line exceeds {} bytes",
            MAX_REQUEST_LINE
        )));
    }
    let line = String::from_utf8_lossy(&raw);
    let request = strip_line_ending(&line);
    if read == 0 || request.trim().is_empty() {
        debug!("Ignoring empty request");
        return Ok(());
    }

    let response = respond(request, context).await;

    writer.write_all(response.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    writer.shutdown().await?;
    Ok(())
}

/// Produces the reply for a request line: the cached value on a hit,
/// otherwise the backend's reply (cached), or [`NOT_FOUND_RESPONSE`] if the
/// backend fails.
pub async fn respond(request: &str, context: &ConnectionContext) -> String {
    if let Some(cached) = context.cache.get(request).await {
        context
            .reporter
            .info(format!("Request served from cache ({})", request));
        return cached;
    }

    context
        .reporter
        .info("Request not found in cache. Forwarding to backend...");
    match context.backend.forward(request).await {
        Ok(response) => {
            context
                .cache
                .put(request.to_string(), response.clone())
                .await;
            response
        }
        Err(err) => {
            context
                .reporter
                .error(format!("Backend connection error: {}", err));
            NOT_FOUND_RESPONSE.to_string()
        }
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
