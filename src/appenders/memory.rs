//! In-memory appender
//!
//! Keeps every appended entry in a shared buffer. Clones share the buffer, so a
//! clone can be handed to a repository while the original is kept for reading.

use crate::core::{Appender, CachedTimestampFormatter, LogEntry, Result, TimestampFormat};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryAppender {
    name: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
    formatter: Arc<CachedTimestampFormatter>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::with_timestamp_format(TimestampFormat::default())
    }

    pub fn with_timestamp_format(format: TimestampFormat) -> Self {
        Self {
            name: "memory".to_string(),
            entries: Arc::new(Mutex::new(Vec::new())),
            formatter: Arc::new(CachedTimestampFormatter::new(format)),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Snapshot of the buffered entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Buffered entries rendered as `<timestamp> [<thread>] <LEVEL> <logger> - <message>`
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| self.render(entry))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn render(&self, entry: &LogEntry) -> String {
        format!(
            "{} [{}] {:5} {} - {}",
            self.formatter.format(&entry.timestamp),
            entry.thread_label(),
            entry.level.to_str(),
            entry.logger_name,
            entry.message
        )
    }
}

impl Default for MemoryAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
