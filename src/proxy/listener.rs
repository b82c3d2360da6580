//! Listener
//!
//! Owns the accepting socket and spawns one task per accepted connection.
//! Connections are not pooled or limited: every accept gets its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::proxy::{handle_connection, ConnectionContext};

/// Lifecycle of the accepting socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Default)]
struct ListenerInner {
    state: ListenerState,
    local_addr: Option<SocketAddr>,
    shutdown: Option<oneshot::Sender<()>>,
    accept_task: Option<JoinHandle<()>>,
}

impl ListenerInner {
    /// Folds an accept loop that ended on its own back into `Stopped`.
    fn reconcile(&mut self) {
        let finished = self
            .accept_task
            .as_ref()
            .map_or(false, JoinHandle::is_finished);
        if self.state == ListenerState::Running && finished {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.state = ListenerState::Stopped;
        self.local_addr = None;
        self.shutdown = None;
        self.accept_task = None;
    }
}

// == Listener ==
#[derive(Debug, Clone)]
pub struct Listener {
    port: u16,
    inner: Arc<Mutex<ListenerInner>>,
    context: ConnectionContext,
}

impl Listener {
    /// Creates a stopped listener for `port` (0 picks an ephemeral port).
    pub fn new(port: u16, context: ConnectionContext) -> Self {
        Self {
            port,
            inner: Arc::new(Mutex::new(ListenerInner::default())),
            context,
        }
    }

    pub async fn state(&self) -> ListenerState {
        let mut inner = self.inner.lock().await;
        inner.reconcile();
        inner.state
    }

    pub async fn local_addr(&self) -> Option<SocketAddr> {
        let mut inner = self.inner.lock().await;
        inner.reconcile();
        inner.local_addr
    }

    // == Start ==
    /// Binds the port and spawns the accept loop.
    ///
    /// Already running: reports a warning and returns the bound address.
    /// Bind failure: reports it and stays stopped.
    pub async fn start(&self) -> Result<SocketAddr> {
        let reporter = &self.context.reporter;
        let mut inner = self.inner.lock().await;
        inner.reconcile();

        if inner.state == ListenerState::Running {
            reporter.warn("Server is already running.");
            if let Some(addr) = inner.local_addr {
                return Ok(addr);
            }
        }

        inner.state = ListenerState::Starting;
        let listener = match TcpListener::bind(("0.0.0.0", self.port)).await {
            Ok(listener) => listener,
            Err(err) => {
                reporter.error(format!("Error starting server: {}", err));
                inner.reset();
                return Err(ProxyError::BindFailure {
                    port: self.port,
                    source: err,
                });
            }
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                reporter.error(format!("Error starting server: {}", err));
                inner.reset();
                return Err(ProxyError::BindFailure {
                    port: self.port,
                    source: err,
                });
            }
        };

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(accept_loop(listener, rx, self.context.clone()));

        inner.state = ListenerState::Running;
        inner.local_addr = Some(addr);
        inner.shutdown = Some(tx);
        inner.accept_task = Some(task);
        reporter.info(format!("Server started on port {}", addr.port()));
        Ok(addr)
    }

    // == Stop ==
    /// Closes the accepting socket. In-flight connections keep running and
    /// are not waited for. Returns false (with a warning) if not running.
    pub async fn stop(&self) -> bool {
        let reporter = &self.context.reporter;
        let mut inner = self.inner.lock().await;
        inner.reconcile();

        if inner.state != ListenerState::Running {
            reporter.warn("Server is not running.");
            return false;
        }

        inner.state = ListenerState::Stopping;
        if let Some(shutdown) = inner.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = inner.accept_task.take() {
            if let Err(err) = task.await {
                reporter.error(format!("Error stopping server: {}", err));
            }
        }

        inner.reset();
        reporter.info("Server stopped.");
        true
    }
}

async fn accept_loop(
    listener: TcpListener,
    mut shutdown: oneshot::Receiver<()>,
    context: ConnectionContext,
) {
    loop {
        tokio::select! {
            // A dropped sender also ends the loop.
            _ = &mut shutdown => {
                debug!("Accept loop shutting down");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("Connection {} accepted", peer);
                    tokio::spawn(handle_connection(stream, context.clone()));
                }
                Err(err) => {
                    context.reporter.error(format!("Server error: {}", err));
                    break;
                }
            }
        }
    }
}
