//! Reporting Sink
//!
//! Human-readable status events emitted by the relay. The core only knows
//! the [`ReportSink`] trait; presentation is up to whoever consumes it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

// == Event ==
/// Severity attached to a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// A single status event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub at: DateTime<Utc>,
    pub level: EventLevel,
    pub message: String,
}

impl Event {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// == Sink ==
/// Append-only consumer of ordered status events.
pub trait ReportSink: Send + Sync {
    fn record(&self, event: Event);
}

/// In-memory sink retaining the most recent `capacity` events.
#[derive(Debug)]
pub struct EventLog {
    events: Mutex<VecDeque<Event>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// Returns the retained events, oldest first.
    pub fn snapshot(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    /// Returns the retained messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|e| e.message).collect()
    }

    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl ReportSink for EventLog {
    fn record(&self, event: Event) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

// == Reporter ==
/// Cloneable handle that forwards events to a sink and mirrors them to tracing.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn ReportSink>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.sink.record(Event::new(EventLevel::Info, message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.sink.record(Event::new(EventLevel::Warn, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.sink.record(Event::new(EventLevel::Error, message));
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
