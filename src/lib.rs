//! # Rust Logger Registry
//!
//! Repository-scoped logger wrappers for a leveled logging framework.
//!
//! ## Features
//!
//! - **Wrapper Registry**: At most one wrapper per logger, cached per repository
//! - **Shutdown Aware**: A repository's wrappers are dropped when it shuts down
//! - **Level Filtering**: Inclusive level-range filters on the dispatch path
//! - **Cached Timestamps**: Whole-second timestamp prefixes rendered once
//! - **Thread Safe**: Designed for concurrent environments

pub mod appenders;
pub mod core;

pub mod prelude {
    pub use crate::appenders::MemoryAppender;
    pub use crate::core::{
        Appender, CachedTimestampFormatter, Filter, FilterDecision, FnFactory, HandleFactory,
        Hierarchy, HierarchyConfig, HierarchyLogger, LevelRangeFilter, LogEntry, LogHandle,
        LogLevel, LogManager, LoggerError, LoggerId, RegistryConfig, RegistryMetrics,
        RegistryStats, Repository, RepositoryId, Result, ScopedLogger, TimestampFormat,
        TryFnFactory, WrapperFactory, WrapperRegistry,
    };
}

pub use crate::appenders::MemoryAppender;
pub use crate::core::{
    Appender, CachedTimestampFormatter, Filter, FilterDecision, FnFactory, HandleFactory,
    Hierarchy, HierarchyConfig, HierarchyLogger, LevelRangeFilter, LogEntry, LogHandle, LogLevel,
    LogManager, LoggerError, LoggerId, RegistryConfig, RegistryMetrics, RegistryStats, Repository,
    RepositoryId, Result, ScopedLogger, TimestampFormat, TryFnFactory, WrapperFactory,
    WrapperRegistry,
};
