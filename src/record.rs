//! Log records and caller capture.

use std::fmt;
use std::panic::Location;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

use crate::Level;

/// Timestamp layout of every log line: `YYYY-MM-DD hh:mm:ss.sss`.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");

/// Where a log call came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// Source file base name, without directories.
    pub file: String,
    /// Function base name, without module path.
    pub function: String,
    /// Line number, 0 when unknown.
    pub line: u32,
}

impl Caller {
    /// Capture the location of the nearest caller outside the `#[track_caller]` chain.
    ///
    /// Every function between the public logging call and this one must carry
    /// `#[track_caller]`; an unannotated frame in between becomes the reported
    /// location instead of the user's call site.
    #[track_caller]
    pub fn capture(function: &str) -> Self {
        let location = Location::caller();
        Self {
            file: base_file_name(location.file()),
            function: base_function_name(function),
            line: location.line(),
        }
    }

    /// Build a caller from optional parts, as `tracing` metadata reports them.
    pub fn from_parts(file: Option<&str>, function: Option<&str>, line: Option<u32>) -> Self {
        Self {
            file: file.map(base_file_name).unwrap_or_default(),
            function: function.map(base_function_name).unwrap_or_default(),
            line: line.unwrap_or(0),
        }
    }
}

fn base_file_name(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reduce a fully qualified path such as `app::server::run::{{closure}}` to `run`.
fn base_function_name(function: &str) -> String {
    function
        .rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .unwrap_or_default()
        .to_string()
}

/// One log event waiting to be written.
#[derive(Debug, Clone)]
pub struct Record {
    message: String,
    timestamp: String,
    level: Level,
    caller: Caller,
    is_warn_stream: bool,
}

impl Record {
    /// Build a record, formatting the message and timestamp immediately.
    pub fn new(level: Level, args: fmt::Arguments<'_>, caller: Caller, now: OffsetDateTime) -> Self {
        let message = match args.as_str() {
            Some(s) => s.to_string(),
            None => fmt::format(args),
        };
        Self {
            message,
            timestamp: now.format(TIMESTAMP_FORMAT).unwrap_or_default(),
            level,
            caller,
            is_warn_stream: level.is_warn_stream(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// True for Warn, Error and Fatal records. Fixed when the record is built.
    pub fn is_warn_stream(&self) -> bool {
        self.is_warn_stream
    }
}

impl fmt::Display for Record {
    /// `[timestamp] [LEVEL] [file:function:line] message`, without the newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}:{}:{}] {}",
            self.timestamp,
            self.level,
            self.caller.file,
            self.caller.function,
            self.caller.line,
            self.message
        )
    }
}
