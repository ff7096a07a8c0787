//! Property-based tests for rust_logger_registry using proptest

use proptest::prelude::*;
use rust_logger_registry::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const REPOSITORIES: usize = 3;
const LOGGERS_PER_REPOSITORY: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Lookup { repository: usize, logger: usize },
    Shutdown { repository: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..REPOSITORIES, 0..LOGGERS_PER_REPOSITORY)
            .prop_map(|(repository, logger)| Op::Lookup { repository, logger }),
        1 => (0..REPOSITORIES).prop_map(|repository| Op::Shutdown { repository }),
    ]
}

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

// ============================================================================
// WrapperRegistry Tests
// ============================================================================

proptest! {
    /// Wrapper identity holds between shutdowns and the factory runs once per
    /// (logger, repository generation)
    #[test]
    fn test_registry_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let registry = WrapperRegistry::from_fn(move |logger: &Arc<HierarchyLogger>| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            logger.name().to_string()
        });

        let hierarchies: Vec<Arc<Hierarchy>> =
            (0..REPOSITORIES).map(|i| Hierarchy::new(format!("repo{}", i))).collect();
        let loggers: Vec<Vec<Arc<HierarchyLogger>>> = hierarchies
            .iter()
            .map(|h| (0..LOGGERS_PER_REPOSITORY).map(|l| h.get_logger(&format!("l{}", l))).collect())
            .collect();

        let mut model: HashMap<(usize, usize), Arc<String>> = HashMap::new();
        let mut expected_calls = 0;

        for op in ops {
            match op {
                Op::Lookup { repository, logger } => {
                    let wrapper = registry
                        .get_wrapper(&loggers[repository][logger])
                        .unwrap()
                        .unwrap();
                    match model.get(&(repository, logger)) {
                        Some(cached) => prop_assert!(Arc::ptr_eq(cached, &wrapper)),
                        None => {
                            expected_calls += 1;
                            model.insert((repository, logger), wrapper);
                        }
                    }
                }
                Op::Shutdown { repository } => {
                    hierarchies[repository].shutdown();
                    model.retain(|(r, _), _| *r != repository);
                }
            }

            prop_assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
            prop_assert_eq!(registry.stats().wrappers, model.len());
            for (index, hierarchy) in hierarchies.iter().enumerate() {
                let cached = model.keys().any(|(r, _)| *r == index);
                prop_assert_eq!(hierarchy.subscriber_count(), usize::from(cached));
            }
        }
    }

    /// Shutting down one repository never touches another one's wrappers
    #[test]
    fn test_shutdown_is_partitioned(victim in 0..REPOSITORIES) {
        let registry = WrapperRegistry::from_fn(|logger: &Arc<HierarchyLogger>| logger.id());
        let hierarchies: Vec<Arc<Hierarchy>> =
            (0..REPOSITORIES).map(|i| Hierarchy::new(format!("repo{}", i))).collect();
        let loggers: Vec<Arc<HierarchyLogger>> =
            hierarchies.iter().map(|h| h.get_logger("shared.name")).collect();
        let before: Vec<_> = loggers
            .iter()
            .map(|l| registry.get_wrapper(l).unwrap().unwrap())
            .collect();

        hierarchies[victim].shutdown();

        for (index, logger) in loggers.iter().enumerate() {
            prop_assert_eq!(registry.contains(logger), index != victim);
            let after = registry.get_wrapper(logger).unwrap().unwrap();
            prop_assert_eq!(Arc::ptr_eq(&before[index], &after), index != victim);
        }
    }
}

// ============================================================================
// LevelRangeFilter Tests
// ============================================================================

proptest! {
    /// A level passes the range filter exactly when min <= level <= max
    #[test]
    fn test_level_range_decision(
        min in prop::option::of(level_strategy()),
        max in prop::option::of(level_strategy()),
        level in level_strategy(),
        accept_on_match in any::<bool>(),
    ) {
        let filter = match LevelRangeFilter::new(min, max) {
            Ok(filter) => filter.with_accept_on_match(accept_on_match),
            Err(_) => {
                prop_assert!(min > max);
                return Ok(());
            }
        };

        let in_range = min.map_or(true, |m| level >= m) && max.map_or(true, |m| level <= m);
        let decision = filter.decide(&LogEntry::new(level, "prop", "message"));

        let expected = match (in_range, accept_on_match) {
            (false, _) => FilterDecision::Deny,
            (true, true) => FilterDecision::Accept,
            (true, false) => FilterDecision::Neutral,
        };
        prop_assert_eq!(decision, expected);
    }
}

// ============================================================================
// Timestamp Tests
// ============================================================================

proptest! {
    /// Cached formatting is indistinguishable from direct formatting
    #[test]
    fn test_cached_formatter_matches_direct(
        millis in prop::collection::vec(0i64..4_102_444_800_000, 1..30),
        format_index in 0usize..4,
    ) {
        let format = [
            TimestampFormat::Iso8601,
            TimestampFormat::Absolute,
            TimestampFormat::Date,
            TimestampFormat::UnixMillis,
        ][format_index]
            .clone();
        let formatter = CachedTimestampFormatter::new(format.clone());

        for ms in millis {
            let dt = chrono::DateTime::from_timestamp_millis(ms).expect("in range");
            prop_assert_eq!(formatter.format(&dt), format.format(&dt));
        }
    }
}
