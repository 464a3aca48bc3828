//! # Splitlog
//!
//! A file logger with a non-blocking mailbox, separate warning stream and rotation.
//!
//! ## Features
//!
//! - Leveled logging (`trace` .. `fatal`) with caller file, function and line
//! - Warn, error and fatal records go to `{name}.wf.log`, the rest to `{name}.log`
//! - A single background writer; logging calls never wait on disk
//! - Hourly or size-based rotation to `{file}_{timestamp}`
//! - Integration with the `tracing` ecosystem
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use splitlog::FileLogger;
//!
//! let mut config = HashMap::new();
//! config.insert("logPath".to_string(), "./logs".to_string());
//! config.insert("logName".to_string(), "svc".to_string());
//! config.insert("logLevel".to_string(), "info".to_string());
//!
//! let logger = FileLogger::from_map(&config)?;
//! splitlog::debug!(logger, "x");
//! splitlog::info!(logger, "y {}", 5);
//! logger.close();
//! # Ok::<(), splitlog::Error>(())
//! ```

pub mod builder;
pub mod clock;
pub mod config;
pub mod error;
pub mod level;
pub mod logger;
pub mod record;
pub mod rotation;
mod writer;

#[cfg(feature = "tracing-integration")]
pub mod tracing_init;

mod macros;

pub use builder::LogBuilder;
pub use clock::{Clock, SystemClock};
pub use config::{FileLogConfig, SplitType};
pub use error::{Error, Result};
pub use level::Level;
pub use logger::FileLogger;
pub use record::{Caller, Record};
pub use rotation::RotationPolicy;

#[cfg(feature = "tracing-integration")]
pub use tracing_init::{SplitLogLayer, init_logging, shutdown_logging};

/// Start building a [`FileLogger`].
pub fn builder() -> LogBuilder {
    LogBuilder::new()
}
