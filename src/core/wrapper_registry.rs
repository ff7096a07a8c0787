//! Repository-scoped wrapper cache
//!
//! [`WrapperRegistry`] hands out at most one wrapper per logger. Wrappers are
//! grouped by the logger's repository; when a repository announces shutdown,
//! its whole group is dropped and the registry unsubscribes from it. The next
//! lookup for a logger of that repository starts a fresh group.
//!
//! All state sits behind a single mutex. The factory runs with that mutex
//! held, so it must not block on other threads that use the same registry.
//! A factory that calls back into the registry on its own thread gets
//! [`LoggerError::ReentrantLookup`] instead of a deadlock. Shutdown
//! notifications delivered on that thread, by the factory or from inside
//! `subscribe_shutdown`, are queued and applied before the lock is released.

use super::{
    error::{LoggerError, Result},
    metrics::RegistryMetrics,
    repository::{LoggerId, Repository, RepositoryId, ScopedLogger, ShutdownHandler, SubscriptionId},
};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

/// Strategy that builds the wrapper for a logger
///
/// Implement this to customise wrapper construction; the registry keeps the
/// caching and locking.
///
/// # Example
///
/// ```
/// use rust_logger_registry::core::{Result, ScopedLogger, WrapperFactory};
///
/// struct Tagged;
///
/// impl<L: ScopedLogger> WrapperFactory<L> for Tagged {
///     type Wrapper = String;
///
///     fn create_wrapper(&self, logger: &L) -> Result<String> {
///         Ok(format!("[{}]", logger.name()))
///     }
/// }
/// ```
pub trait WrapperFactory<L: ?Sized>: Send + Sync {
    type Wrapper: Send + Sync + 'static;

    fn create_wrapper(&self, logger: &L) -> Result<Self::Wrapper>;
}

/// Adapts an infallible closure into a [`WrapperFactory`]
#[derive(Clone)]
pub struct FnFactory<F>(F);

impl<F> FnFactory<F> {
    pub fn new(create: F) -> Self {
        FnFactory(create)
    }
}

impl<L, W, F> WrapperFactory<L> for FnFactory<F>
where
    L: ?Sized,
    W: Send + Sync + 'static,
    F: Fn(&L) -> W + Send + Sync,
{
    type Wrapper = W;

    fn create_wrapper(&self, logger: &L) -> Result<W> {
        Ok((self.0)(logger))
    }
}

/// Adapts a fallible closure into a [`WrapperFactory`]
#[derive(Clone)]
pub struct TryFnFactory<F>(F);

impl<F> TryFnFactory<F> {
    pub fn new(create: F) -> Self {
        TryFnFactory(create)
    }
}

impl<L, W, F> WrapperFactory<L> for TryFnFactory<F>
where
    L: ?Sized,
    W: Send + Sync + 'static,
    F: Fn(&L) -> Result<W> + Send + Sync,
{
    type Wrapper = W;

    fn create_wrapper(&self, logger: &L) -> Result<W> {
        (self.0)(logger)
    }
}

/// Sizing hints for a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Initial capacity of the repository map
    pub repository_capacity: usize,
    /// Initial capacity of each per-repository wrapper map
    pub logger_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repository_capacity: 4,
            logger_capacity: 32,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_repository_capacity(mut self, capacity: usize) -> Self {
        self.repository_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_logger_capacity(mut self, capacity: usize) -> Self {
        self.logger_capacity = capacity;
        self
    }
}

/// Point-in-time view of the cache contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Repositories with a live inner mapping
    pub repositories: usize,
    /// Cached wrappers across all repositories
    pub wrappers: usize,
}

struct RepositoryEntry<W> {
    /// Distinguishes successive mappings for the same repository
    generation: u64,
    repository: Arc<dyn Repository>,
    subscription: SubscriptionId,
    wrappers: HashMap<LoggerId, Arc<W>>,
}

struct RegistryState<W> {
    repositories: HashMap<RepositoryId, RepositoryEntry<W>>,
    next_generation: u64,
}

struct Shared<W> {
    state: Mutex<RegistryState<W>>,
    /// Thread currently running the factory, if any
    creator: Mutex<Option<ThreadId>>,
    /// Shutdowns delivered on the creator thread while the factory ran
    deferred: Mutex<Vec<(RepositoryId, u64)>>,
    metrics: RegistryMetrics,
    logger_capacity: usize,
}

impl<W: Send + Sync + 'static> Shared<W> {
    fn is_creating_on_current_thread(&self) -> bool {
        *self.creator.lock() == Some(thread::current().id())
    }

    fn shutdown_handler(
        shared: &Arc<Self>,
        repository_id: RepositoryId,
        generation: u64,
    ) -> ShutdownHandler {
        let shared = Arc::downgrade(shared);
        Arc::new(move |sender: &dyn Repository| {
            if let Some(shared) = Weak::upgrade(&shared) {
                shared.on_shutdown(sender, repository_id, generation);
            }
        })
    }

    fn on_shutdown(&self, sender: &dyn Repository, repository_id: RepositoryId, generation: u64) {
        if sender.id() != repository_id {
            trace!(
                expected = %repository_id,
                sender = %sender.id(),
                "ignoring shutdown from unrecognized repository"
            );
            return;
        }

        // The creator thread already holds the state lock
        if self.is_creating_on_current_thread() {
            self.deferred.lock().push((repository_id, generation));
            return;
        }

        let mut state = self.state.lock();
        self.release(&mut state, repository_id, generation);
    }

    fn apply_deferred(&self, state: &mut RegistryState<W>) {
        let pending = std::mem::take(&mut *self.deferred.lock());
        for (repository_id, generation) in pending {
            self.release(state, repository_id, generation);
        }
    }

    fn release(&self, state: &mut RegistryState<W>, repository_id: RepositoryId, generation: u64) {
        let current = state
            .repositories
            .get(&repository_id)
            .map(|entry| entry.generation);
        if current != Some(generation) {
            trace!(
                repository = %repository_id,
                generation,
                ?current,
                "ignoring stale shutdown notification"
            );
            return;
        }

        if let Some(entry) = state.repositories.remove(&repository_id) {
            entry.repository.unsubscribe_shutdown(entry.subscription);
            self.metrics.record_repository_released();
            debug!(
                repository = %repository_id,
                name = entry.repository.name(),
                wrappers = entry.wrappers.len(),
                "released wrappers for repository"
            );
        }
    }
}

/// Registry lock that applies deferred shutdowns when acquired and again
/// when released, including while unwinding from a factory panic
struct StateGuard<'a, W: Send + Sync + 'static> {
    shared: &'a Shared<W>,
    state: MutexGuard<'a, RegistryState<W>>,
}

impl<'a, W: Send + Sync + 'static> StateGuard<'a, W> {
    fn lock(shared: &'a Shared<W>) -> Self {
        let mut state = shared.state.lock();
        shared.apply_deferred(&mut state);
        Self { shared, state }
    }
}

impl<W: Send + Sync + 'static> Deref for StateGuard<'_, W> {
    type Target = RegistryState<W>;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<W: Send + Sync + 'static> DerefMut for StateGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<W: Send + Sync + 'static> Drop for StateGuard<'_, W> {
    fn drop(&mut self) {
        self.shared.apply_deferred(&mut self.state);
    }
}

/// Clears the creator slot even if the factory panics
struct CreatorGuard<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> CreatorGuard<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *slot.lock() = Some(thread::current().id());
        Self { slot }
    }
}

impl Drop for CreatorGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

/// Concurrent cache of one wrapper per (repository, logger)
///
/// # Example
///
/// ```
/// use rust_logger_registry::core::{Hierarchy, HierarchyLogger, ScopedLogger, WrapperRegistry};
/// use std::sync::Arc;
///
/// let registry = WrapperRegistry::from_fn(|logger: &Arc<HierarchyLogger>| {
///     format!("wrap({})", logger.name())
/// });
///
/// let hierarchy = Hierarchy::new("app");
/// let logger = hierarchy.get_logger("a");
///
/// let first = registry.get_wrapper(&logger).unwrap().unwrap();
/// let second = registry.get_wrapper(&logger).unwrap().unwrap();
/// assert_eq!(*first, "wrap(a)");
/// assert!(Arc::ptr_eq(&first, &second));
///
/// hierarchy.shutdown();
/// let third = registry.get_wrapper(&logger).unwrap().unwrap();
/// assert_eq!(first, third);
/// assert!(!Arc::ptr_eq(&first, &third));
/// ```
pub struct WrapperRegistry<L, F>
where
    L: ScopedLogger + ?Sized,
    F: WrapperFactory<L>,
{
    factory: F,
    shared: Arc<Shared<F::Wrapper>>,
    _logger: PhantomData<fn(&L)>,
}

impl<L, F> WrapperRegistry<L, F>
where
    L: ScopedLogger + ?Sized,
    F: WrapperFactory<L>,
{
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, RegistryConfig::default())
    }

    #[must_use]
    pub fn with_config(factory: F, config: RegistryConfig) -> Self {
        Self {
            factory,
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState {
                    repositories: HashMap::with_capacity(config.repository_capacity),
                    next_generation: 0,
                }),
                creator: Mutex::new(None),
                deferred: Mutex::new(Vec::new()),
                metrics: RegistryMetrics::new(),
                logger_capacity: config.logger_capacity,
            }),
            _logger: PhantomData,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.shared.metrics
    }

    /// Get the wrapper for `logger`, creating it on first use
    ///
    /// Returns `Ok(None)` when no logger is given or the logger has no
    /// repository; nothing is cached in that case. Factory errors are
    /// returned as-is and leave no entry behind, so the next call retries.
    pub fn get_wrapper<'a>(
        &self,
        logger: impl Into<Option<&'a L>>,
    ) -> Result<Option<Arc<F::Wrapper>>>
    where
        L: 'a,
    {
        let Some(logger) = logger.into() else {
            return Ok(None);
        };
        let Some(repository) = logger.repository() else {
            trace!(logger = logger.name(), "logger has no repository");
            return Ok(None);
        };
        if self.shared.is_creating_on_current_thread() {
            return Err(LoggerError::reentrant_lookup(logger.name()));
        }

        let repository_id = repository.id();
        let logger_id = logger.id();

        let mut state = StateGuard::lock(&self.shared);

        let RegistryState {
            repositories,
            next_generation,
        } = &mut *state;
        let entry = repositories.entry(repository_id).or_insert_with(|| {
            let generation = *next_generation;
            *next_generation += 1;
            let handler = Shared::shutdown_handler(&self.shared, repository_id, generation);
            // A repository that notifies during subscribe reaches on_shutdown here
            let subscription = {
                let _subscribing = CreatorGuard::enter(&self.shared.creator);
                repository.subscribe_shutdown(handler)
            };
            self.shared.metrics.record_repository_registered();
            debug!(
                repository = %repository_id,
                name = repository.name(),
                generation,
                "registered repository"
            );
            RepositoryEntry {
                generation,
                repository: Arc::clone(&repository),
                subscription,
                wrappers: HashMap::with_capacity(self.shared.logger_capacity),
            }
        });

        if let Some(wrapper) = entry.wrappers.get(&logger_id) {
            self.shared.metrics.record_hit();
            return Ok(Some(Arc::clone(wrapper)));
        }

        let created = {
            let _creating = CreatorGuard::enter(&self.shared.creator);
            self.factory.create_wrapper(logger)
        };
        match created {
            Ok(wrapper) => {
                let wrapper = Arc::new(wrapper);
                entry.wrappers.insert(logger_id, Arc::clone(&wrapper));
                self.shared.metrics.record_miss();
                Ok(Some(wrapper))
            }
            Err(e) => {
                self.shared.metrics.record_factory_failure();
                debug!(logger = logger.name(), error = %e, "wrapper factory failed");
                Err(e)
            }
        }
    }

    /// Whether a wrapper for `logger` is currently cached
    pub fn contains(&self, logger: &L) -> bool {
        let Some(repository) = logger.repository() else {
            return false;
        };
        self.shared
            .state
            .lock()
            .repositories
            .get(&repository.id())
            .is_some_and(|entry| entry.wrappers.contains_key(&logger.id()))
    }

    pub fn stats(&self) -> RegistryStats {
        let state = self.shared.state.lock();
        RegistryStats {
            repositories: state.repositories.len(),
            wrappers: state
                .repositories
                .values()
                .map(|entry| entry.wrappers.len())
                .sum(),
        }
    }
}

impl<L, W, G> WrapperRegistry<L, FnFactory<G>>
where
    L: ScopedLogger + ?Sized,
    W: Send + Sync + 'static,
    G: Fn(&L) -> W + Send + Sync,
{
    /// Registry whose wrappers are built by an infallible closure
    #[must_use]
    pub fn from_fn(create: G) -> Self {
        Self::new(FnFactory::new(create))
    }
}

impl<L, W, G> WrapperRegistry<L, TryFnFactory<G>>
where
    L: ScopedLogger + ?Sized,
    W: Send + Sync + 'static,
    G: Fn(&L) -> Result<W> + Send + Sync,
{
    /// Registry whose wrappers are built by a fallible closure
    #[must_use]
    pub fn try_from_fn(create: G) -> Self {
        Self::new(TryFnFactory::new(create))
    }
}

impl<L, F> Drop for WrapperRegistry<L, F>
where
    L: ScopedLogger + ?Sized,
    F: WrapperFactory<L>,
{
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        for (repository_id, entry) in state.repositories.drain() {
            entry.repository.unsubscribe_shutdown(entry.subscription);
            trace!(repository = %repository_id, "unsubscribed on registry drop");
        }
    }
}

impl<L, F> fmt::Debug for WrapperRegistry<L, F>
where
    L: ScopedLogger + ?Sized,
    F: WrapperFactory<L>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperRegistry")
            .field("stats", &self.stats())
            .field("metrics", self.metrics())
            .finish()
    }
}
