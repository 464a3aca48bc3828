//! Bridge from the `tracing` ecosystem into a [`FileLogger`].

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::record::Caller;
use crate::{Error, FileLogConfig, FileLogger, Level, Record, Result};

/// Logger installed by [`init_logging`], kept so [`shutdown_logging`] can drain it.
static GLOBAL_LOGGER: Lazy<Mutex<Option<Arc<FileLogger>>>> = Lazy::new(|| Mutex::new(None));

/// Target prefix of this crate's own diagnostics. They are never fed back into the logger.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// A `tracing_subscriber` layer that writes events through a [`FileLogger`].
#[derive(Debug, Clone)]
pub struct SplitLogLayer {
    logger: Arc<FileLogger>,
}

impl SplitLogLayer {
    pub fn new(logger: Arc<FileLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<FileLogger> {
        &self.logger
    }
}

impl<S> Layer<S> for SplitLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        // Events carry a module path but no function name.
        let caller = Caller::from_parts(metadata.file(), None, metadata.line());
        let record = Record::new(
            level,
            format_args!("{}", visitor.finish()),
            caller,
            self.logger.now(),
        );
        self.logger.submit(record);
    }
}

/// Collects the `message` field followed by any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Create a [`FileLogger`] from `config` and install it as the global `tracing` subscriber.
///
/// `RUST_LOG`, when set, replaces the configured level as the subscriber's
/// filter. The logger's own level still applies on top of it.
pub fn init_logging(config: &FileLogConfig) -> Result<Arc<FileLogger>> {
    let env_filter = EnvFilter::try_new(effective_log_spec(config))
        .map_err(|e| Error::Init(e.to_string()))?;

    let logger = Arc::new(FileLogger::new(config.clone())?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(SplitLogLayer::new(Arc::clone(&logger)))
        .try_init()
        .map_err(|e| Error::Init(e.to_string()))?;

    *GLOBAL_LOGGER.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&logger));
    Ok(logger)
}

/// Drain and close the logger installed by [`init_logging`].
///
/// Events logged afterwards are discarded.
pub fn shutdown_logging() {
    let logger = GLOBAL_LOGGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();
    if let Some(logger) = logger {
        logger.close();
    }
}

/// Filter directive for the subscriber: `RUST_LOG` if set and non-empty, else the configured level.
fn effective_log_spec(config: &FileLogConfig) -> String {
    if let Ok(rust_log) = std::env::var("RUST_LOG")
        && !rust_log.is_empty()
    {
        return rust_log;
    }

    match config.log_level {
        Level::Trace => "trace",
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warn => "warn",
        // tracing has nothing above ERROR.
        Level::Error | Level::Fatal => "error",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn with_layer(dir: &Path, level: Level) -> (Arc<FileLogger>, tracing::Dispatch) {
        let logger = Arc::new(FileLogger::new(FileLogConfig::new(dir, "app", level)).unwrap());
        let subscriber =
            tracing_subscriber::registry().with(SplitLogLayer::new(Arc::clone(&logger)));
        (logger, tracing::Dispatch::new(subscriber))
    }

    #[test]
    fn test_is_own_target() {
        assert!(is_own_target("splitlog"));
        assert!(is_own_target("splitlog::writer"));
        assert!(!is_own_target("splitlog_demo"));
        assert!(!is_own_target("app"));
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Trace);
        assert_eq!(Level::from(tracing::Level::INFO), Level::Info);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_layer_writes_split_streams() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, dispatch) = with_layer(dir.path(), Level::Info);

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(target: "app", "hidden");
            tracing::info!(target: "app", user = "ada", "login ok");
            tracing::error!(target: "app", code = 500, "request failed");
        });
        logger.flush();

        let main = lines(logger.main_path());
        let warn = lines(logger.warn_path());
        assert_eq!(main.len(), 1);
        assert!(main[0].contains("[INFO] [tracing_init.rs::"), "{}", main[0]);
        assert!(main[0].ends_with("login ok user=ada"), "{}", main[0]);
        assert_eq!(warn.len(), 1);
        assert!(warn[0].ends_with("request failed code=500"), "{}", warn[0]);
    }

    #[test]
    fn test_layer_ignores_own_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, dispatch) = with_layer(dir.path(), Level::Trace);

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(target: "splitlog::writer", "internal");
            tracing::warn!(target: "app", "external");
        });
        logger.flush();

        let warn = lines(logger.warn_path());
        assert_eq!(warn.len(), 1);
        assert!(warn[0].ends_with("external"));
    }

    #[test]
    fn test_effective_log_spec_uses_config_level() {
        let prev = std::env::var_os("RUST_LOG");
        unsafe {
            std::env::remove_var("RUST_LOG");
        }

        let cfg = FileLogConfig::new("/tmp", "app", Level::Fatal);
        assert_eq!(effective_log_spec(&cfg), "error");
        let cfg = FileLogConfig::new("/tmp", "app", Level::Debug);
        assert_eq!(effective_log_spec(&cfg), "debug");

        unsafe {
            std::env::set_var("RUST_LOG", "trace");
        }
        assert_eq!(effective_log_spec(&cfg), "trace");

        unsafe {
            match prev {
                Some(v) => std::env::set_var("RUST_LOG", v),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
    }

    #[test]
    fn test_init_logging_and_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = FileLogConfig::new(dir.path(), "global", Level::Info);
        // May fail if another test already installed a global subscriber, but must not panic.
        if let Ok(logger) = init_logging(&cfg) {
            tracing::info!(target: "app", "through the global subscriber");
            shutdown_logging();
            assert!(
                lines(logger.main_path())
                    .iter()
                    .any(|l| l.ends_with("through the global subscriber"))
            );
        }
    }
}
