//! Repository and logger abstractions
//!
//! A repository is a logging configuration domain that can announce its
//! shutdown to observers. A scoped logger belongs to exactly one repository.
//! Both are identified by process-unique numeric ids rather than by name, so
//! two loggers with the same name in different repositories (or a logger
//! recreated after its predecessor was dropped) never collide.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REPOSITORY_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryId(u64);

impl RepositoryId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        RepositoryId(NEXT_REPOSITORY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "repo#{}", self.0)
    }
}

/// Stable identity of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoggerId(u64);

impl LoggerId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        LoggerId(NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logger#{}", self.0)
    }
}

/// Token returned by [`Repository::subscribe_shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn next() -> Self {
        SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Observer invoked with the repository that is shutting down
///
/// Handlers may run on any thread. Repositories must invoke them without
/// holding their own observer lock, so a handler is free to unsubscribe.
pub type ShutdownHandler = Arc<dyn Fn(&dyn Repository) + Send + Sync>;

/// A logging configuration domain that announces its shutdown
pub trait Repository: Send + Sync {
    fn id(&self) -> RepositoryId;

    fn name(&self) -> &str;

    /// Register a shutdown observer
    ///
    /// A repository that has already shut down may invoke `handler` before
    /// returning; the registry defers such notifications.
    fn subscribe_shutdown(&self, handler: ShutdownHandler) -> SubscriptionId;

    /// Remove a shutdown observer; `false` if it was not registered
    fn unsubscribe_shutdown(&self, subscription: SubscriptionId) -> bool;
}

/// A logger scoped to a repository
pub trait ScopedLogger: Send + Sync {
    fn id(&self) -> LoggerId;

    fn name(&self) -> &str;

    /// Owning repository, `None` if detached or if the repository is gone
    fn repository(&self) -> Option<Arc<dyn Repository>>;
}

impl<T: ScopedLogger + ?Sized> ScopedLogger for Arc<T> {
    fn id(&self) -> LoggerId {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn repository(&self) -> Option<Arc<dyn Repository>> {
        (**self).repository()
    }
}
