use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Errors that can occur in the logging library
#[derive(ThisError, Debug)]
pub enum Error {
    /// Configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),
    /// A log file could not be opened while constructing the logger.
    ///
    /// This is a startup failure: the logger cannot exist without its files,
    /// so callers are expected to abort rather than retry.
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        /// The file (or directory) that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Initialization failed.
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
