//! Core registry, repository and logging types

pub mod appender;
pub mod error;
pub mod hierarchy;
pub mod level_filter;
pub mod log_entry;
pub mod log_handle;
pub mod log_level;
pub mod metrics;
pub mod repository;
pub mod timestamp;
pub mod wrapper_registry;

pub use appender::Appender;
pub use error::{LoggerError, Result};
pub use hierarchy::{Hierarchy, HierarchyConfig, HierarchyLogger};
pub use level_filter::{evaluate_chain, Filter, FilterDecision, LevelRangeFilter};
pub use log_entry::LogEntry;
pub use log_handle::{HandleFactory, LogHandle, LogManager};
pub use log_level::LogLevel;
pub use metrics::RegistryMetrics;
pub use repository::{
    LoggerId, Repository, RepositoryId, ScopedLogger, ShutdownHandler, SubscriptionId,
};
pub use timestamp::{CachedTimestampFormatter, TimestampFormat};
pub use wrapper_registry::{
    FnFactory, RegistryConfig, RegistryStats, TryFnFactory, WrapperFactory, WrapperRegistry,
};
