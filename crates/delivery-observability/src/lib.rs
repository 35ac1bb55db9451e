//! Observability setup for the delivery ordering system.
//!
//! This crate provides:
//! - `LogLevel` / `LogFormat` - Serializable logging knobs for configuration files
//! - `LoggingConfig` - The `[logging]` configuration section
//! - `init_tracing` - Installs the global `tracing` subscriber

mod logging;

pub use logging::*;
