//! Appender implementations

pub mod memory;

pub use memory::MemoryAppender;

pub use crate::core::Appender;
