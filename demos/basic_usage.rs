//! Basic registry usage example
//!
//! Demonstrates cached wrappers per logger, shutdown-driven invalidation,
//! level-range filtering and timestamp rendering.
//!
//! Run with: cargo run --example basic_usage

use rust_logger_registry::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Logger Registry - Basic Usage Example ===\n");

    // Build a hierarchy from JSON configuration
    let config = HierarchyConfig::from_json(
        r#"{
            "name": "shop",
            "threshold": "Debug",
            "filters": [{"level_min": "Debug", "level_max": "Error"}]
        }"#,
    )?;
    let hierarchy = Hierarchy::from_config(config)?;

    let memory = MemoryAppender::with_timestamp_format(TimestampFormat::Absolute);
    hierarchy.add_appender(Box::new(memory.clone()));

    println!("1. Handles are cached per logger:");
    let manager = LogManager::new();
    let orders = manager.get_handle(&hierarchy, "shop.orders")?;
    let again = manager.get_handle(&hierarchy, "shop.orders")?;
    println!("   same handle: {}", Arc::ptr_eq(&orders, &again));

    println!("\n2. Logging through the handle:");
    orders.trace("Trace message (below threshold)");
    orders.debug("Debug message (visible)");
    orders.info("Info message (visible)");
    orders.error("Error message (visible)");
    orders.fatal("Fatal message (outside range filter)");
    for line in memory.lines() {
        println!("   {}", line);
    }

    println!("\n3. Custom wrappers with a closure factory:");
    let tags = WrapperRegistry::from_fn(|logger: &Arc<HierarchyLogger>| {
        format!("<{}>", logger.name().to_uppercase())
    });
    let payments = hierarchy.get_logger("shop.payments");
    if let Some(tag) = tags.get_wrapper(&payments)? {
        println!("   wrapper for {}: {}", payments.name(), tag);
    }

    println!("\n4. Shutdown invalidates cached wrappers:");
    println!("   before: {:?}", manager.stats());
    hierarchy.shutdown();
    println!("   after:  {:?}", manager.stats());
    let fresh = manager.get_handle(&hierarchy, "shop.orders")?;
    println!("   new handle created: {}", !Arc::ptr_eq(&orders, &fresh));

    println!("\n5. Loggers without a repository get no wrapper:");
    let orphan = HierarchyLogger::detached("orphan");
    println!("   wrapper: {:?}", manager.handle_for(&orphan)?);

    println!(
        "\nRegistry metrics: {} lookups, {:.1}% hit rate",
        manager.metrics().lookups(),
        manager.metrics().hit_rate()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
