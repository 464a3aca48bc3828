use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::rotation::parse_size;
use crate::{Error, Level, Result};

/// Default mailbox capacity.
pub const DEFAULT_CHAN_SIZE: usize = 50_000;
/// Default size threshold for `SplitType::Size`: 100 MiB.
pub const DEFAULT_SPLIT_SIZE: u64 = 100 * 1024 * 1024;

/// How log files are rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Archive the active file whenever the wall-clock hour changes.
    #[default]
    Hour,
    /// Archive the active file once it grows past `log_split_size` bytes.
    Size,
}

impl SplitType {
    /// Anything other than `"size"` selects hourly rotation.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("size") {
            SplitType::Size
        } else {
            SplitType::Hour
        }
    }
}

impl<'de> Deserialize<'de> for SplitType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SplitType::parse_lenient(&s))
    }
}

/// Configuration for a file logger.
///
/// Keys use the camelCase names of the string-map contract (`logPath`,
/// `logName`, ...) so the same document works from a map, YAML or TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLogConfig {
    /// Directory holding the log files.
    pub log_path: PathBuf,
    /// Base name; files are `{log_name}.log` and `{log_name}.wf.log`.
    pub log_name: String,
    /// Minimum severity written.
    #[serde(deserialize_with = "lenient_level")]
    pub log_level: Level,
    /// Mailbox capacity.
    #[serde(default = "default_chan_size", deserialize_with = "lenient_chan_size")]
    pub log_chan_size: usize,
    /// Rotation mode.
    #[serde(default)]
    pub log_split_type: SplitType,
    /// Size threshold in bytes, used when `log_split_type` is `Size`.
    #[serde(default = "default_split_size", deserialize_with = "lenient_split_size")]
    pub log_split_size: u64,
}

impl FileLogConfig {
    /// Create a config with the required fields and defaults for the rest.
    pub fn new(log_path: impl Into<PathBuf>, log_name: impl Into<String>, log_level: Level) -> Self {
        Self {
            log_path: log_path.into(),
            log_name: log_name.into(),
            log_level,
            log_chan_size: default_chan_size(),
            log_split_type: SplitType::Hour,
            log_split_size: default_split_size(),
        }
    }

    /// Build a config from string keys and values.
    ///
    /// `logPath`, `logName` and `logLevel` are required. Malformed numbers fall
    /// back to their defaults instead of failing.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| Error::Config(format!("not found {} config", key)))
        };

        let log_path = required("logPath")?;
        let log_name = required("logName")?;
        let log_level = Level::parse_lenient(&required("logLevel")?);

        let log_chan_size = map
            .get("logChanSize")
            .map(|s| parse_chan_size(s))
            .unwrap_or_else(default_chan_size);
        let log_split_type = map
            .get("logSplitType")
            .map(|s| SplitType::parse_lenient(s))
            .unwrap_or_default();
        let log_split_size = map
            .get("logSplitSize")
            .map(|s| parse_split_size(s))
            .unwrap_or_else(default_split_size);

        Ok(Self {
            log_path: log_path.into(),
            log_name,
            log_level,
            log_chan_size,
            log_split_type,
            log_split_size,
        })
    }

    /// Set the mailbox capacity.
    pub fn with_chan_size(mut self, size: usize) -> Self {
        self.log_chan_size = size;
        self
    }

    /// Rotate hourly.
    pub fn with_split_by_hour(mut self) -> Self {
        self.log_split_type = SplitType::Hour;
        self
    }

    /// Rotate once a file exceeds `max_size` bytes.
    pub fn with_split_by_size(mut self, max_size: u64) -> Self {
        self.log_split_type = SplitType::Size;
        self.log_split_size = max_size;
        self
    }

    /// Check the fields that serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        if self.log_name.trim().is_empty() {
            return Err(Error::Config("logName must not be empty".to_string()));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(Error::Config("logPath must not be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the normal stream file.
    pub fn main_file_path(&self) -> PathBuf {
        self.log_path.join(format!("{}.log", self.log_name))
    }

    /// Path of the warn/error/fatal stream file.
    pub fn warn_file_path(&self) -> PathBuf {
        self.log_path.join(format!("{}.wf.log", self.log_name))
    }
}

fn default_chan_size() -> usize {
    DEFAULT_CHAN_SIZE
}

fn default_split_size() -> u64 {
    DEFAULT_SPLIT_SIZE
}

fn parse_chan_size(s: &str) -> usize {
    match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_CHAN_SIZE,
    }
}

fn parse_split_size(s: &str) -> u64 {
    parse_size(s).unwrap_or(DEFAULT_SPLIT_SIZE)
}

/// Numeric value that may be written as a number or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberValue {
    Number(i64),
    String(String),
    Other(serde::de::IgnoredAny),
}

impl NumberValue {
    fn as_text(&self) -> Option<String> {
        match self {
            NumberValue::Number(n) => Some(n.to_string()),
            NumberValue::String(s) => Some(s.clone()),
            NumberValue::Other(_) => None,
        }
    }
}

fn lenient_chan_size<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberValue::deserialize(deserializer)?;
    Ok(value
        .as_text()
        .map(|s| parse_chan_size(&s))
        .unwrap_or(DEFAULT_CHAN_SIZE))
}

fn lenient_split_size<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberValue::deserialize(deserializer)?;
    Ok(value
        .as_text()
        .map(|s| parse_split_size(&s))
        .unwrap_or(DEFAULT_SPLIT_SIZE))
}

fn lenient_level<'de, D>(deserializer: D) -> std::result::Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(Level::parse_lenient(&s))
}
