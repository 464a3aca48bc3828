use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use time::OffsetDateTime;

use crate::clock::{Clock, SystemClock};
use crate::record::Caller;
use crate::writer::{self, FileSink, Message};
use crate::{Error, FileLogConfig, Level, Record, Result};

/// A leveled logger writing to `{name}.log` and `{name}.wf.log` from a background thread.
///
/// Logging calls never block: they format the record and try to push it into a
/// bounded mailbox. When the mailbox is full the record is dropped and counted
/// (see [`FileLogger::dropped`]). A single writer thread drains the mailbox in
/// order, rotates files and writes them.
///
/// Caller locations are captured with `#[track_caller]`. Every frame between
/// user code and the logger must carry that attribute, otherwise the location
/// of the intermediate frame is recorded. The macros ([`info!`](crate::info)
/// and friends) add the enclosing function name, which the plain methods leave
/// empty.
pub struct FileLogger {
    min_level: AtomicU8,
    sender: Sender<Message>,
    capacity: usize,
    dropped: AtomicU64,
    closed: AtomicBool,
    clock: Arc<dyn Clock>,
    worker: Mutex<Option<JoinHandle<()>>>,
    main_path: PathBuf,
    warn_path: PathBuf,
}

impl FileLogger {
    /// Open the log files and start the writer thread.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the configuration is incomplete
    /// - [`Error::Open`] if the directory or a log file cannot be opened. The
    ///   logger cannot run without its files, so this should abort startup.
    /// - [`Error::Init`] if the writer thread cannot be spawned
    pub fn new(config: FileLogConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Build a logger from string keys (`logPath`, `logName`, `logLevel`, ...).
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        Self::new(FileLogConfig::from_map(map)?)
    }

    /// Like [`FileLogger::new`], reading time from `clock`.
    pub fn with_clock(config: FileLogConfig, clock: impl Clock) -> Result<Self> {
        let (logger, receiver, sink) = Self::unstarted(config, Arc::new(clock))?;
        logger.start(receiver, sink)?;
        Ok(logger)
    }

    /// Validate, open the files and create the mailbox without starting the writer.
    fn unstarted(
        config: FileLogConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, Receiver<Message>, FileSink)> {
        config.validate()?;
        let sink = FileSink::open(&config, Arc::clone(&clock))?;
        let capacity = config.log_chan_size.max(1);
        let (sender, receiver) = crossbeam_channel::bounded(capacity);

        let logger = Self {
            min_level: AtomicU8::new(config.log_level as u8),
            sender,
            capacity,
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            clock,
            worker: Mutex::new(None),
            main_path: config.main_file_path(),
            warn_path: config.warn_file_path(),
        };
        Ok((logger, receiver, sink))
    }

    fn start(&self, receiver: Receiver<Message>, sink: FileSink) -> Result<()> {
        let handle = std::thread::Builder::new()
            .name("splitlog-writer".to_string())
            .spawn(move || writer::run(receiver, sink))
            .map_err(|e| Error::Init(format!("failed to spawn log writer: {}", e)))?;
        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(())
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        Level::from_index(i64::from(self.min_level.load(Ordering::Relaxed)))
    }

    /// Change the minimum level. Takes effect for subsequent calls.
    pub fn set_level(&self, level: Level) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a call at `level` would produce a record.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Log at [`Level::Trace`].
    ///
    /// The record's function field is left empty: a method cannot see the
    /// name of the function calling it. Use [`trace!`](crate::trace) and the
    /// other macros to record it.
    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, "", args);
    }

    /// Log at [`Level::Debug`].
    ///
    /// Leaves the function field empty; [`debug!`](crate::debug) fills it in.
    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, "", args);
    }

    /// Log at [`Level::Info`].
    ///
    /// Leaves the function field empty; [`info!`](crate::info) fills it in.
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, "", args);
    }

    /// Log at [`Level::Warn`].
    ///
    /// Leaves the function field empty; [`warn!`](crate::warn) fills it in.
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, "", args);
    }

    /// Log at [`Level::Error`].
    ///
    /// Leaves the function field empty; [`error!`](crate::error) fills it in.
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, "", args);
    }

    /// Log at [`Level::Fatal`].
    ///
    /// Leaves the function field empty; [`fatal!`](crate::fatal) fills it in.
    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, "", args);
    }

    /// Log at `level`, recording `function` as the calling function.
    ///
    /// This is what the logging macros expand to.
    #[track_caller]
    pub fn log(&self, level: Level, function: &str, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let caller = Caller::capture(function);
        self.submit(Record::new(level, args, caller, self.clock.now()));
    }

    /// Enqueue an already built record without blocking.
    ///
    /// The level filter is not applied here. A full mailbox drops the record.
    pub fn submit(&self, record: Record) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        match self.sender.try_send(Message::Record(record)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Current time according to the logger's clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Block until every record enqueued so far has been written.
    pub fn flush(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let (ack, done) = crossbeam_channel::bounded(1);
        if self.sender.send(Message::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }

    /// Number of records discarded because the mailbox was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Mailbox capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Path of the normal stream file.
    pub fn main_path(&self) -> &Path {
        &self.main_path
    }

    /// Path of the warn/error/fatal stream file.
    pub fn warn_path(&self) -> &Path {
        &self.warn_path
    }

    /// Stop accepting records, write everything already enqueued, close the files.
    ///
    /// Blocks until the writer thread has exited. Calling it again is a no-op,
    /// and dropping the logger closes it as well.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Fails only if the writer is already gone.
        let _ = self.sender.send(Message::Shutdown);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            tracing::warn!("log writer thread panicked");
        }
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("level", &self.level())
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped())
            .field("main_path", &self.main_path)
            .field("warn_path", &self.warn_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use time::macros::datetime;

    fn config(dir: &Path) -> FileLogConfig {
        FileLogConfig::new(dir, "svc", Level::Trace)
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_level_filter() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(config(dir.path())).unwrap();

        for threshold in Level::ALL {
            logger.set_level(threshold);
            assert_eq!(logger.level(), threshold);
            for level in Level::ALL {
                logger.log(level, "", format_args!("{}-{}", threshold, level));
            }
        }
        logger.close();

        let mut written: Vec<String> = lines(logger.main_path());
        written.extend(lines(logger.warn_path()));
        for threshold in Level::ALL {
            for level in Level::ALL {
                let suffix = format!("] {}-{}", threshold, level);
                let found = written.iter().any(|l| l.ends_with(&suffix));
                assert_eq!(found, level >= threshold, "{} at threshold {}", level, threshold);
            }
        }
    }

    #[test]
    fn test_burst_keeps_oldest_capacity_records() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path()).with_chan_size(8);
        let (logger, receiver, sink) =
            FileLogger::unstarted(cfg, Arc::new(SystemClock)).unwrap();

        // Nothing drains the mailbox yet, so the burst overflows it.
        for i in 0..20 {
            logger.info(format_args!("seq {}", i));
        }
        assert_eq!(logger.dropped(), 12);

        logger.start(receiver, sink).unwrap();
        logger.close();

        let written = lines(logger.main_path());
        assert_eq!(written.len(), 8);
        for (i, line) in written.iter().enumerate() {
            assert!(line.ends_with(&format!("seq {}", i)), "{}", line);
        }
    }

    #[test]
    fn test_close_drains_and_stops_accepting() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(config(dir.path())).unwrap();

        for i in 0..100 {
            logger.info(format_args!("msg {}", i));
        }
        logger.close();
        logger.info(format_args!("after close"));
        logger.close();

        let written = lines(logger.main_path());
        assert_eq!(written.len(), 100);
        assert!(written.iter().all(|l| !l.contains("after close")));
    }

    #[test]
    fn test_flush_is_a_barrier() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(config(dir.path())).unwrap();

        logger.warn(format_args!("disk at {}%", 91));
        logger.flush();

        let written = lines(logger.warn_path());
        assert_eq!(written.len(), 1);
        assert!(written[0].contains("[WARN]"));
        assert!(written[0].ends_with("disk at 91%"));
    }

    #[test]
    fn test_timestamp_comes_from_clock() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ManualClock::new(datetime!(2026-07-08 09:10:11.012 UTC));
        let logger = FileLogger::with_clock(config(dir.path()), clock).unwrap();

        logger.error(format_args!("boom"));
        logger.flush();

        let written = lines(logger.warn_path());
        assert!(written[0].starts_with("[2026-07-08 09:10:11.012] [ERROR] [logger.rs::"));
    }

    #[test]
    fn test_construction_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = FileLogConfig::new(dir.path(), "", Level::Info);
        assert!(matches!(FileLogger::new(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(config(dir.path()).with_chan_size(0)).unwrap();
        assert_eq!(logger.capacity(), 1);
    }
}
