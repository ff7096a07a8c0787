//! Leveled logging handles
//!
//! [`LogHandle`] is the wrapper application code holds on to. [`LogManager`]
//! keeps one handle per logger by composing a [`WrapperRegistry`] with
//! [`HandleFactory`], so handles are dropped when their hierarchy shuts down.

use super::{
    error::{LoggerError, Result},
    hierarchy::{Hierarchy, HierarchyLogger},
    log_level::LogLevel,
    metrics::RegistryMetrics,
    repository::ScopedLogger,
    wrapper_registry::{RegistryConfig, RegistryStats, WrapperFactory, WrapperRegistry},
};
use std::sync::Arc;

/// Leveled facade over a [`HierarchyLogger`]
#[derive(Debug)]
pub struct LogHandle {
    logger: Arc<HierarchyLogger>,
}

impl LogHandle {
    pub fn new(logger: Arc<HierarchyLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<HierarchyLogger> {
        &self.logger
    }

    pub fn name(&self) -> &str {
        self.logger.name()
    }

    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.logger.is_enabled_for(level)
    }

    #[inline]
    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled_for(LogLevel::Debug)
    }

    #[inline]
    pub fn is_info_enabled(&self) -> bool {
        self.is_enabled_for(LogLevel::Info)
    }

    #[inline]
    pub fn is_warn_enabled(&self) -> bool {
        self.is_enabled_for(LogLevel::Warn)
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) -> bool {
        self.logger.log(level, message)
    }

    #[inline]
    pub fn trace(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Fatal, message);
    }
}

/// Builds a [`LogHandle`] for a hierarchy logger
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleFactory;

impl WrapperFactory<Arc<HierarchyLogger>> for HandleFactory {
    type Wrapper = LogHandle;

    fn create_wrapper(&self, logger: &Arc<HierarchyLogger>) -> Result<LogHandle> {
        Ok(LogHandle::new(Arc::clone(logger)))
    }
}

/// Entry point for obtaining cached [`LogHandle`]s
///
/// # Example
///
/// ```
/// use rust_logger_registry::prelude::*;
/// use std::sync::Arc;
///
/// let manager = LogManager::new();
/// let hierarchy = Hierarchy::new("app");
/// let memory = MemoryAppender::new();
/// hierarchy.add_appender(Box::new(memory.clone()));
///
/// let log = manager.get_handle(&hierarchy, "app.http").unwrap();
/// log.info("listening on :8080");
///
/// let again = manager.get_handle(&hierarchy, "app.http").unwrap();
/// assert!(Arc::ptr_eq(&log, &again));
/// assert_eq!(memory.len(), 1);
/// ```
#[derive(Debug)]
pub struct LogManager {
    handles: WrapperRegistry<Arc<HierarchyLogger>, HandleFactory>,
}

impl LogManager {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            handles: WrapperRegistry::with_config(HandleFactory, config),
        }
    }

    /// Handle for the named logger of `hierarchy`, creating both on first use
    pub fn get_handle(&self, hierarchy: &Hierarchy, name: &str) -> Result<Arc<LogHandle>> {
        self.handle(&hierarchy.get_logger(name))
    }

    /// Handle for an existing logger that must still have a repository
    ///
    /// Fails with [`LoggerError::RepositoryUnavailable`] for detached loggers
    /// and for loggers whose hierarchy has been dropped.
    pub fn handle(&self, logger: &Arc<HierarchyLogger>) -> Result<Arc<LogHandle>> {
        self.handle_for(logger)?
            .ok_or_else(|| LoggerError::repository_unavailable(logger.name()))
    }

    /// Handle for an existing logger; `None` if it has no repository
    pub fn handle_for(&self, logger: &Arc<HierarchyLogger>) -> Result<Option<Arc<LogHandle>>> {
        self.handles.get_wrapper(logger)
    }

    pub fn stats(&self) -> RegistryStats {
        self.handles.stats()
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        self.handles.metrics()
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
