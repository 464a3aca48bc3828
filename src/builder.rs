//! Builder pattern for configuring and starting a file logger.
//!
//! # Example
//!
//! ```rust,no_run
//! use splitlog::Level;
//!
//! let logger = splitlog::builder()
//!     .with_path("/var/log/user_server")
//!     .with_name("user_server")
//!     .with_level(Level::Debug)
//!     .with_split_size(64 * 1024 * 1024)
//!     .build()
//!     .expect("Failed to initialize logging");
//!
//! splitlog::info!(logger, "init logger success");
//! ```

use std::path::PathBuf;

use crate::config::{DEFAULT_CHAN_SIZE, DEFAULT_SPLIT_SIZE};
use crate::{Error, FileLogConfig, FileLogger, Level, Result, SplitType};

/// A fluent builder for [`FileLogConfig`] and [`FileLogger`].
///
/// Path, name and level have no defaults; [`LogBuilder::config`] reports
/// whichever is missing.
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    path: Option<PathBuf>,
    name: Option<String>,
    level: Option<Level>,
    chan_size: Option<usize>,
    split_type: SplitType,
    split_size: Option<u64>,
}

impl LogBuilder {
    /// Create a new LogBuilder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a LogBuilder from an existing configuration.
    pub fn from_config(config: FileLogConfig) -> Self {
        Self {
            path: Some(config.log_path),
            name: Some(config.log_name),
            level: Some(config.log_level),
            chan_size: Some(config.log_chan_size),
            split_type: config.log_split_type,
            split_size: Some(config.log_split_size),
        }
    }

    /// Directory holding the log files.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Base file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Minimum severity written.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Mailbox capacity.
    pub fn with_chan_size(mut self, size: usize) -> Self {
        self.chan_size = Some(size);
        self
    }

    /// Rotate hourly (the default).
    pub fn with_hourly_split(mut self) -> Self {
        self.split_type = SplitType::Hour;
        self
    }

    /// Rotate once a file exceeds `max_size` bytes.
    pub fn with_split_size(mut self, max_size: u64) -> Self {
        self.split_type = SplitType::Size;
        self.split_size = Some(max_size);
        self
    }

    /// Get the configuration without starting a logger.
    pub fn config(self) -> Result<FileLogConfig> {
        let missing = |key: &str| Error::Config(format!("not found {} config", key));
        Ok(FileLogConfig {
            log_path: self.path.ok_or_else(|| missing("logPath"))?,
            log_name: self.name.ok_or_else(|| missing("logName"))?,
            log_level: self.level.ok_or_else(|| missing("logLevel"))?,
            log_chan_size: self.chan_size.unwrap_or(DEFAULT_CHAN_SIZE),
            log_split_type: self.split_type,
            log_split_size: self.split_size.unwrap_or(DEFAULT_SPLIT_SIZE),
        })
    }

    /// Open the log files and start the writer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - path, name or level was never set
    /// - the log directory or files cannot be opened
    pub fn build(self) -> Result<FileLogger> {
        FileLogger::new(self.config()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_path_name_level() {
        let err = LogBuilder::new().with_name("svc").with_level(Level::Info).config();
        assert!(err.unwrap_err().to_string().contains("logPath"));

        let err = LogBuilder::new().with_path("/tmp").with_level(Level::Info).config();
        assert!(err.unwrap_err().to_string().contains("logName"));

        let err = LogBuilder::new().with_path("/tmp").with_name("svc").config();
        assert!(err.unwrap_err().to_string().contains("logLevel"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = LogBuilder::new()
            .with_path("/tmp")
            .with_name("svc")
            .with_level(Level::Warn)
            .config()
            .unwrap();
        assert_eq!(config.log_chan_size, DEFAULT_CHAN_SIZE);
        assert_eq!(config.log_split_type, SplitType::Hour);
        assert_eq!(config.log_split_size, DEFAULT_SPLIT_SIZE);
    }

    #[test]
    fn test_builder_chaining() {
        let config = LogBuilder::new()
            .with_path("/tmp")
            .with_name("svc")
            .with_level(Level::Debug)
            .with_chan_size(64)
            .with_split_size(4096)
            .config()
            .unwrap();
        assert_eq!(config.log_chan_size, 64);
        assert_eq!(config.log_split_type, SplitType::Size);
        assert_eq!(config.log_split_size, 4096);

        let config = LogBuilder::from_config(config).with_hourly_split().config().unwrap();
        assert_eq!(config.log_split_type, SplitType::Hour);
        assert_eq!(config.log_name, "svc");
    }

    #[test]
    fn test_builder_build_opens_files() {
        let dir = tempfile::tempdir().unwrap();
        let logger = crate::builder()
            .with_path(dir.path())
            .with_name("built")
            .with_level(Level::Info)
            .build()
            .unwrap();
        assert!(logger.main_path().exists());
        assert!(logger.warn_path().exists());
    }
}
