//! Bounded, newest-first event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::buffer::BoundedBuffer;

/// Default number of log entries retained.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// A single recorded event.
///
/// `line_id` is `None` for system-wide events such as a disaster trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub line_id: Option<String>,
    pub voltage: Option<f64>,
    pub message: String,
}

impl LogEntry {
    /// An event tied to a specific line and reading.
    pub fn for_line(
        timestamp: DateTime<Utc>,
        line_id: &str,
        voltage: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            line_id: Some(line_id.to_string()),
            voltage: Some(voltage),
            message: message.into(),
        }
    }

    /// A system-wide event.
    pub fn system(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            line_id: None,
            voltage: None,
            message: message.into(),
        }
    }
}

/// Event log holding the most recent entries, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    entries: BoundedBuffer<LogEntry>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BoundedBuffer::new(capacity),
        }
    }

    /// Record an entry as the newest, evicting the oldest when full.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.to_vec()
    }
}
