//! Event filters
//!
//! A filter looks at a [`LogEntry`] and votes on whether it should reach the
//! appenders. Filters are evaluated in order; the first `Accept` or `Deny`
//! wins and an all-`Neutral` chain lets the entry through.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of a single filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterDecision {
    /// Drop the entry, skip remaining filters
    Deny,
    /// No opinion, ask the next filter
    Neutral,
    /// Log the entry, skip remaining filters
    Accept,
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDecision::Deny => write!(f, "Deny"),
            FilterDecision::Neutral => write!(f, "Neutral"),
            FilterDecision::Accept => write!(f, "Accept"),
        }
    }
}

pub trait Filter: Send + Sync {
    fn decide(&self, entry: &LogEntry) -> FilterDecision;
}

impl<T: Filter + ?Sized> Filter for Box<T> {
    fn decide(&self, entry: &LogEntry) -> FilterDecision {
        (**self).decide(entry)
    }
}

/// Run a filter chain; `true` if the entry should be logged
pub fn evaluate_chain<'a, F, I>(filters: I, entry: &LogEntry) -> bool
where
    F: Filter + ?Sized + 'a,
    I: IntoIterator<Item = &'a F>,
{
    for filter in filters {
        match filter.decide(entry) {
            FilterDecision::Deny => return false,
            FilterDecision::Accept => return true,
            FilterDecision::Neutral => {}
        }
    }
    true
}

/// Filter that matches entries whose level lies within an inclusive range
///
/// Entries outside the range are denied. Entries inside it are accepted when
/// `accept_on_match` is set, otherwise left to the rest of the chain.
///
/// # Example
///
/// ```
/// use rust_logger_registry::core::{Filter, FilterDecision, LevelRangeFilter, LogEntry, LogLevel};
///
/// let filter = LevelRangeFilter::new(Some(LogLevel::Info), Some(LogLevel::Error)).unwrap();
///
/// let debug = LogEntry::new(LogLevel::Debug, "app", "noise");
/// let warn = LogEntry::new(LogLevel::Warn, "app", "disk at 90%");
/// assert_eq!(filter.decide(&debug), FilterDecision::Deny);
/// assert_eq!(filter.decide(&warn), FilterDecision::Accept);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRangeFilter {
    #[serde(default)]
    level_min: Option<LogLevel>,
    #[serde(default)]
    level_max: Option<LogLevel>,
    #[serde(default = "default_accept_on_match")]
    accept_on_match: bool,
}

fn default_accept_on_match() -> bool {
    true
}

impl LevelRangeFilter {
    /// Create a filter for `[level_min, level_max]`; either bound may be open
    pub fn new(level_min: Option<LogLevel>, level_max: Option<LogLevel>) -> Result<Self> {
        let filter = Self {
            level_min,
            level_max,
            accept_on_match: true,
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Filter with no bounds; matches every level
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            level_min: None,
            level_max: None,
            accept_on_match: true,
        }
    }

    #[must_use]
    pub fn with_accept_on_match(mut self, accept_on_match: bool) -> Self {
        self.accept_on_match = accept_on_match;
        self
    }

    pub fn level_min(&self) -> Option<LogLevel> {
        self.level_min
    }

    pub fn level_max(&self) -> Option<LogLevel> {
        self.level_max
    }

    pub fn accept_on_match(&self) -> bool {
        self.accept_on_match
    }

    /// Check the bounds, e.g. after deserializing
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.level_min, self.level_max) {
            if min > max {
                return Err(LoggerError::config(
                    "LevelRangeFilter",
                    format!("level_min {} is above level_max {}", min, max),
                ));
            }
        }
        Ok(())
    }

    /// Whether `level` lies within the configured range
    #[inline]
    pub fn contains(&self, level: LogLevel) -> bool {
        self.level_min.map_or(true, |min| level >= min)
            && self.level_max.map_or(true, |max| level <= max)
    }
}

impl Filter for LevelRangeFilter {
    fn decide(&self, entry: &LogEntry) -> FilterDecision {
        if !self.contains(entry.level) {
            FilterDecision::Deny
        } else if self.accept_on_match {
            FilterDecision::Accept
        } else {
            FilterDecision::Neutral
        }
    }
}
