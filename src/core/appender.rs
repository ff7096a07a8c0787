//! Output destinations attached to a [`Hierarchy`](super::Hierarchy)

use super::{error::Result, log_entry::LogEntry};

/// Receives entries that passed the hierarchy's threshold and filter chain
///
/// A failing appender does not stop delivery to the others; the hierarchy
/// reports the error and moves on. `flush` runs once more when the
/// hierarchy shuts down, right before the appender is detached.
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Label used in diagnostics
    fn name(&self) -> &str;
}
