//! Integration tests for the logger registry
//!
//! These tests verify:
//! - Wrapper identity per logger and per repository
//! - Invalidation driven by repository shutdown
//! - Absent logger / absent repository handling
//! - End-to-end logging through handles, filters and appenders
//! - Timestamp rendering in appender output

use rust_logger_registry::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_registry(
    calls: Arc<AtomicUsize>,
) -> WrapperRegistry<Arc<HierarchyLogger>, FnFactory<impl Fn(&Arc<HierarchyLogger>) -> String + Send + Sync>>
{
    WrapperRegistry::from_fn(move |logger: &Arc<HierarchyLogger>| {
        calls.fetch_add(1, Ordering::SeqCst);
        format!("wrap({})", logger.name())
    })
}

#[test]
fn test_wrap_example_lifecycle() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Arc::clone(&calls));
    let hierarchy = Hierarchy::new("app");
    let logger_a = hierarchy.get_logger("a");

    let first = registry.get_wrapper(&logger_a).unwrap().unwrap();
    assert_eq!(*first, "wrap(a)");

    let second = registry.get_wrapper(&logger_a).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    hierarchy.shutdown();

    let third = registry.get_wrapper(&logger_a).unwrap().unwrap();
    assert_eq!(*third, "wrap(a)");
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_absent_inputs_do_not_mutate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Arc::clone(&calls));

    assert!(registry.get_wrapper(None).unwrap().is_none());

    let orphan = HierarchyLogger::detached("orphan");
    assert!(registry.get_wrapper(&orphan).unwrap().is_none());

    let gone = {
        let hierarchy = Hierarchy::new("temporary");
        hierarchy.get_logger("x")
    };
    assert!(registry.get_wrapper(&gone).unwrap().is_none());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(registry.stats(), RegistryStats { repositories: 0, wrappers: 0 });
    assert_eq!(registry.metrics().lookups(), 0);
}

#[test]
fn test_every_cached_repository_has_a_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(calls);
    let hierarchies: Vec<Arc<Hierarchy>> =
        (0..4).map(|i| Hierarchy::new(format!("h{}", i))).collect();

    for hierarchy in &hierarchies {
        for name in ["a", "b", "c"] {
            registry.get_wrapper(&hierarchy.get_logger(name)).unwrap();
        }
    }

    assert_eq!(registry.stats(), RegistryStats { repositories: 4, wrappers: 12 });
    assert!(hierarchies.iter().all(|h| h.subscriber_count() == 1));

    hierarchies[1].shutdown();
    hierarchies[3].shutdown();

    assert_eq!(registry.stats(), RegistryStats { repositories: 2, wrappers: 6 });
    let subscribed: Vec<usize> = hierarchies.iter().map(|h| h.subscriber_count()).collect();
    assert_eq!(subscribed, vec![1, 0, 1, 0]);
}

#[test]
fn test_two_registries_on_one_hierarchy() {
    let hierarchy = Hierarchy::new("shared");
    let upper = WrapperRegistry::from_fn(|l: &Arc<HierarchyLogger>| l.name().to_uppercase());
    let lower = WrapperRegistry::from_fn(|l: &Arc<HierarchyLogger>| l.name().to_lowercase());
    let logger = hierarchy.get_logger("Mixed");

    assert_eq!(*upper.get_wrapper(&logger).unwrap().unwrap(), "MIXED");
    assert_eq!(*lower.get_wrapper(&logger).unwrap().unwrap(), "mixed");
    assert_eq!(hierarchy.subscriber_count(), 2);

    hierarchy.shutdown();
    assert!(!upper.contains(&logger));
    assert!(!lower.contains(&logger));
    assert_eq!(hierarchy.subscriber_count(), 0);
}

#[test]
fn test_custom_factory_strategy() {
    struct Prefixed {
        prefix: String,
    }

    impl WrapperFactory<Arc<HierarchyLogger>> for Prefixed {
        type Wrapper = String;

        fn create_wrapper(&self, logger: &Arc<HierarchyLogger>) -> Result<String> {
            if logger.name().is_empty() {
                return Err(LoggerError::wrapper_creation("<root>", "empty logger name"));
            }
            Ok(format!("{}{}", self.prefix, logger.name()))
        }
    }

    let registry = WrapperRegistry::new(Prefixed {
        prefix: "svc:".to_string(),
    });
    let hierarchy = Hierarchy::new("app");

    let named = registry.get_wrapper(&hierarchy.get_logger("db")).unwrap().unwrap();
    assert_eq!(*named, "svc:db");

    let err = registry.get_wrapper(&hierarchy.get_logger("")).unwrap_err();
    assert!(matches!(err, LoggerError::WrapperCreation { .. }));
    assert_eq!(registry.stats().wrappers, 1);
}

#[test]
fn test_end_to_end_logging_through_manager() {
    let config = HierarchyConfig::from_json(
        r#"{
            "name": "orders",
            "threshold": "Debug",
            "filters": [{"level_max": "Error"}]
        }"#,
    )
    .unwrap();
    let hierarchy = Hierarchy::from_config(config).unwrap();
    let memory = MemoryAppender::with_timestamp_format(TimestampFormat::Absolute);
    hierarchy.add_appender(Box::new(memory.clone()));

    let manager = LogManager::new();
    let log = manager.get_handle(&hierarchy, "orders.api").unwrap();

    log.trace("below threshold");
    log.debug("validating order 17");
    log.error("payment declined\nFAKE ENTRY");
    log.fatal("denied by range filter");

    let entries = memory.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, LogLevel::Debug);
    assert_eq!(entries[1].message, "payment declined\\nFAKE ENTRY");

    let lines = memory.lines();
    assert!(lines[1].contains("ERROR orders.api - payment declined"));
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_shutdown_detaches_appenders_and_handles() {
    let hierarchy = Hierarchy::new("app");
    let memory = MemoryAppender::new();
    hierarchy.add_appender(Box::new(memory.clone()));
    let manager = LogManager::new();

    let log = manager.get_handle(&hierarchy, "app.worker").unwrap();
    log.info("before shutdown");
    hierarchy.shutdown();

    // The old handle still works but the appender is gone
    log.info("after shutdown");
    assert_eq!(memory.len(), 1);
    assert_eq!(manager.stats().repositories, 0);

    let fresh = manager.get_handle(&hierarchy, "app.worker").unwrap();
    assert!(!Arc::ptr_eq(&log, &fresh));
    assert_eq!(manager.metrics().repositories_registered(), 2);
}
