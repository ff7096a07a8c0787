//! Concrete logger repository
//!
//! A [`Hierarchy`] owns named loggers, a threshold, a filter chain and the
//! appenders events are delivered to. It announces its shutdown to observers
//! registered through [`Repository::subscribe_shutdown`].

use super::{
    appender::Appender,
    error::Result,
    level_filter::{evaluate_chain, Filter, LevelRangeFilter},
    log_entry::LogEntry,
    log_level::LogLevel,
    repository::{LoggerId, Repository, RepositoryId, ScopedLogger, ShutdownHandler, SubscriptionId},
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Declarative hierarchy settings
///
/// # Example
///
/// ```
/// use rust_logger_registry::core::{Hierarchy, HierarchyConfig, LogLevel};
///
/// let config = HierarchyConfig::from_json(
///     r#"{"name":"billing","threshold":"Debug","filters":[{"level_max":"Error"}]}"#,
/// )
/// .unwrap();
///
/// let hierarchy = Hierarchy::from_config(config).unwrap();
/// assert_eq!(hierarchy.threshold(), LogLevel::Debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub name: String,
    #[serde(default)]
    pub threshold: LogLevel,
    #[serde(default)]
    pub filters: Vec<LevelRangeFilter>,
}

impl HierarchyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threshold: LogLevel::default(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: LogLevel) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: LevelRangeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HierarchyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.filters.iter().try_for_each(LevelRangeFilter::validate)
    }
}

pub struct Hierarchy {
    id: RepositoryId,
    name: String,
    self_ref: Weak<Hierarchy>,
    threshold: RwLock<LogLevel>,
    loggers: RwLock<HashMap<String, Arc<HierarchyLogger>>>,
    filters: RwLock<Vec<Box<dyn Filter>>>,
    /// `Appender::append` takes `&mut self`, so delivery is serialised here
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    observers: Mutex<Vec<(SubscriptionId, ShutdownHandler)>>,
}

impl Hierarchy {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|self_ref| Self {
            id: RepositoryId::next(),
            name,
            self_ref: self_ref.clone(),
            threshold: RwLock::new(LogLevel::default()),
            loggers: RwLock::new(HashMap::new()),
            filters: RwLock::new(Vec::new()),
            appenders: Mutex::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
        })
    }

    pub fn from_config(config: HierarchyConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let hierarchy = Self::new(config.name);
        hierarchy.set_threshold(config.threshold);
        for filter in config.filters {
            hierarchy.add_filter(Box::new(filter));
        }
        Ok(hierarchy)
    }

    pub fn threshold(&self) -> LogLevel {
        *self.threshold.read()
    }

    pub fn set_threshold(&self, level: LogLevel) {
        *self.threshold.write() = level;
    }

    /// Get or create the logger with the given name
    pub fn get_logger(&self, name: &str) -> Arc<HierarchyLogger> {
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }

        let mut loggers = self.loggers.write();
        let logger = loggers.entry(name.to_string()).or_insert_with(|| {
            Arc::new(HierarchyLogger::attached(name, self.self_ref.clone()))
        });
        Arc::clone(logger)
    }

    /// Existing logger, without creating one
    pub fn exists(&self, name: &str) -> Option<Arc<HierarchyLogger>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn current_loggers(&self) -> Vec<Arc<HierarchyLogger>> {
        self.loggers.read().values().cloned().collect()
    }

    pub fn add_filter(&self, filter: Box<dyn Filter>) {
        self.filters.write().push(filter);
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.appenders.lock().push(appender);
    }

    pub fn appender_count(&self) -> usize {
        self.appenders.lock().len()
    }

    /// Number of registered shutdown observers
    pub fn subscriber_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Run the filter chain and hand the entry to every appender
    ///
    /// Returns `false` if a filter denied the entry. The threshold is not
    /// checked here; loggers check it before building the entry.
    pub fn dispatch(&self, entry: &LogEntry) -> bool {
        if !evaluate_chain(self.filters.read().iter(), entry) {
            return false;
        }

        let mut appenders = self.appenders.lock();
        for appender in appenders.iter_mut() {
            if let Err(e) = appender.append(entry) {
                warn!(
                    repository = %self.name,
                    appender = appender.name(),
                    error = %e,
                    "appender failed"
                );
            }
        }
        true
    }

    /// Notify shutdown observers, then flush and detach all appenders
    ///
    /// Observers are called without the observer lock held. The hierarchy
    /// stays usable afterwards and may be shut down again.
    pub fn shutdown(&self) {
        info!(repository = %self.name, id = %self.id, "shutting down repository");

        let handlers: Vec<ShutdownHandler> = self
            .observers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(self as &dyn Repository);
        }

        let mut appenders = self.appenders.lock();
        for appender in appenders.iter_mut() {
            if let Err(e) = appender.flush() {
                warn!(
                    repository = %self.name,
                    appender = appender.name(),
                    error = %e,
                    "flush failed during shutdown"
                );
            }
        }
        appenders.clear();
    }
}

impl Repository for Hierarchy {
    fn id(&self) -> RepositoryId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe_shutdown(&self, handler: ShutdownHandler) -> SubscriptionId {
        let subscription = SubscriptionId::next();
        self.observers.lock().push((subscription, handler));
        subscription
    }

    fn unsubscribe_shutdown(&self, subscription: SubscriptionId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }
}

impl std::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hierarchy")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("threshold", &self.threshold())
            .finish_non_exhaustive()
    }
}

/// Named logger living in a [`Hierarchy`]
#[derive(Debug)]
pub struct HierarchyLogger {
    id: LoggerId,
    name: String,
    hierarchy: Weak<Hierarchy>,
    level: RwLock<Option<LogLevel>>,
}

impl HierarchyLogger {
    fn attached(name: &str, hierarchy: Weak<Hierarchy>) -> Self {
        Self {
            id: LoggerId::next(),
            name: name.to_string(),
            hierarchy,
            level: RwLock::new(None),
        }
    }

    /// Logger that belongs to no repository
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: LoggerId::next(),
            name: name.into(),
            hierarchy: Weak::new(),
            level: RwLock::new(None),
        })
    }

    pub fn hierarchy(&self) -> Option<Arc<Hierarchy>> {
        self.hierarchy.upgrade()
    }

    /// Level override; `None` defers to the hierarchy threshold alone
    pub fn level(&self) -> Option<LogLevel> {
        *self.level.read()
    }

    pub fn set_level(&self, level: Option<LogLevel>) {
        *self.level.write() = level;
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        let Some(hierarchy) = self.hierarchy() else {
            return false;
        };
        level >= hierarchy.threshold() && self.level().map_or(true, |min| level >= min)
    }

    /// Log a message; `true` if it reached the appenders
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) -> bool {
        let Some(hierarchy) = self.hierarchy() else {
            debug!(logger = %self.name, "dropping event from detached logger");
            return false;
        };
        if level < hierarchy.threshold() || self.level().is_some_and(|min| level < min) {
            return false;
        }

        let entry = LogEntry::new(level, self.name.as_str(), message);
        hierarchy.dispatch(&entry)
    }
}

impl ScopedLogger for HierarchyLogger {
    fn id(&self) -> LoggerId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn repository(&self) -> Option<Arc<dyn Repository>> {
        self.hierarchy
            .upgrade()
            .map(|hierarchy| hierarchy as Arc<dyn Repository>)
    }
}
