//! Wrapper registry metrics for observability
//!
//! Counters describing how a [`WrapperRegistry`](super::WrapperRegistry) is
//! used: cache hits and misses, factory failures and repository lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for registry observability
///
/// # Example
///
/// ```
/// use rust_logger_registry::RegistryMetrics;
///
/// let metrics = RegistryMetrics::new();
///
/// metrics.record_miss();
/// metrics.record_hit();
/// metrics.record_hit();
///
/// assert_eq!(metrics.lookups(), 3);
/// assert!((metrics.hit_rate() - 66.66).abs() < 0.1);
/// ```
#[derive(Debug)]
pub struct RegistryMetrics {
    /// Lookups answered from the cache
    hits: AtomicU64,

    /// Lookups that created a new wrapper
    misses: AtomicU64,

    /// Factory invocations that returned an error
    factory_failures: AtomicU64,

    /// Inner mappings created (one shutdown subscription each)
    repositories_registered: AtomicU64,

    /// Inner mappings dropped on repository shutdown
    repositories_released: AtomicU64,
}

impl RegistryMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            factory_failures: AtomicU64::new(0),
            repositories_registered: AtomicU64::new(0),
            repositories_released: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn factory_failures(&self) -> u64 {
        self.factory_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn repositories_registered(&self) -> u64 {
        self.repositories_registered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn repositories_released(&self) -> u64 {
        self.repositories_released.load(Ordering::Relaxed)
    }

    /// Lookups that reached the cache (hits + misses + failures)
    #[inline]
    pub fn lookups(&self) -> u64 {
        self.hits() + self.misses() + self.factory_failures()
    }

    /// Record a cache hit
    #[inline]
    pub fn record_hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a wrapper creation
    #[inline]
    pub fn record_miss(&self) -> u64 {
        self.misses.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed wrapper creation
    #[inline]
    pub fn record_factory_failure(&self) -> u64 {
        self.factory_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_repository_registered(&self) -> u64 {
        self.repositories_registered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_repository_released(&self) -> u64 {
        self.repositories_released.fetch_add(1, Ordering::Relaxed)
    }

    /// Get hit rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.lookups() as f64;
        if lookups == 0.0 {
            0.0
        } else {
            (self.hits() as f64 / lookups) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.factory_failures.store(0, Ordering::Relaxed);
        self.repositories_registered.store(0, Ordering::Relaxed);
        self.repositories_released.store(0, Ordering::Relaxed);
    }
}

impl Default for RegistryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RegistryMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            factory_failures: AtomicU64::new(self.factory_failures()),
            repositories_registered: AtomicU64::new(self.repositories_registered()),
            repositories_released: AtomicU64::new(self.repositories_released()),
        }
    }
}
