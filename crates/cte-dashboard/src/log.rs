//! Append-only activity log shown beside the dashboard.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Entries kept before the oldest is dropped.
pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

/// Bounded log of completed operations, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message stamped with the current time.
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(Utc::now(), message);
    }

    pub fn push_at(&mut self, timestamp: DateTime<Utc>, message: impl Into<String>) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_log_keeps_latest_hundred() {
        let mut log = ActivityLog::new();
        for i in 0..105 {
            log.push(format!("entry {i}"));
        }
        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        assert_eq!(log.iter().next().map(|e| e.message.as_str()), Some("entry 5"));
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("entry 104"));
    }

    #[test]
    fn test_entry_display() {
        let mut log = ActivityLog::new();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        log.push_at(at, "Found 450 studies");
        assert_eq!(
            log.last().unwrap().to_string(),
            "2025-03-01T12:00:00.000Z Found 450 studies"
        );
    }
}
