use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};

/// Severity of a log record.
///
/// Ordering follows severity: `Trace < Debug < Info < Warn < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Very fine grained tracing output.
    Trace = 0,
    /// Debugging output.
    Debug = 1,
    /// Normal operational messages.
    Info = 2,
    /// Something unexpected that the program recovered from.
    Warn = 3,
    /// An operation failed.
    Error = 4,
    /// The program cannot continue.
    Fatal = 5,
}

impl Level {
    /// All levels, lowest severity first.
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Convert a numeric level, clamping anything outside `0..=5` to `Debug`.
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            5 => Level::Fatal,
            _ => Level::Debug,
        }
    }

    /// Parse level text, falling back to `Debug` for unknown input.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Level::Debug)
    }

    /// Upper-case text written into the log line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Whether records of this level go to the `.wf.log` stream.
    pub fn is_warn_stream(&self) -> bool {
        matches!(self, Level::Warn | Level::Error | Level::Fatal)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
