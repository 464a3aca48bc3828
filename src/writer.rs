use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::clock::Clock;
use crate::rotation::{RotationPolicy, archive_path};
use crate::{Error, FileLogConfig, Record, Result};

/// What travels through the mailbox.
pub(crate) enum Message {
    /// A record to write.
    Record(Record),
    /// Acknowledge once everything enqueued before this message is written.
    Flush(Sender<()>),
    /// Stop after everything enqueued before this message is written.
    Shutdown,
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// One output file together with its rotation state.
#[derive(Debug)]
struct StreamFile {
    path: PathBuf,
    /// `None` after a failed reopen; writes are skipped until an open succeeds.
    file: Option<File>,
    policy: RotationPolicy,
    reopen_failed: bool,
    archive_failed: bool,
}

impl StreamFile {
    fn open(path: PathBuf, policy: RotationPolicy) -> Result<Self> {
        let file = open_append(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            file: Some(file),
            policy,
            reopen_failed: false,
            archive_failed: false,
        })
    }

    /// Rotate if the policy asks for it, or retry opening a stream left without a handle.
    ///
    /// Returns whether a handle is available for the next write.
    fn prepare(&mut self, clock: &dyn Clock) -> bool {
        let now = clock.now();
        let file = &self.file;
        let current_size = || file.as_ref().and_then(|f| f.metadata().ok()).map(|m| m.len());
        if let Some(suffix) = self.policy.check(now, current_size) {
            self.rotate(&suffix);
        } else if self.file.is_none() {
            self.reopen();
        }
        self.file.is_some()
    }

    /// Close the active file, archive it under `suffix` and start a fresh one.
    fn rotate(&mut self, suffix: &str) {
        // Close before renaming.
        self.file = None;

        let archive = archive_path(&self.path, suffix);
        match fs::rename(&self.path, &archive) {
            Ok(()) => {
                if self.archive_failed {
                    tracing::info!(path = %self.path.display(), "log file archived again");
                }
                self.archive_failed = false;
                tracing::debug!(
                    from = %self.path.display(),
                    to = %archive.display(),
                    "rotated log file"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                // A size-split stream keeps its oversized file and retries on every write.
                if self.archive_failed {
                    tracing::debug!(path = %self.path.display(), error = %e, "log file still cannot be archived");
                } else {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to archive log file, appending to the active file"
                    );
                }
                self.archive_failed = true;
            }
        }

        self.reopen();
    }

    fn reopen(&mut self) {
        match open_append(&self.path) {
            Ok(file) => {
                if self.reopen_failed {
                    tracing::info!(path = %self.path.display(), "log file reopened");
                }
                self.file = Some(file);
                self.reopen_failed = false;
            }
            Err(e) => {
                if self.reopen_failed {
                    tracing::debug!(path = %self.path.display(), error = %e, "log file still unavailable");
                } else {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to reopen log file, dropping writes until it can be opened"
                    );
                }
                self.reopen_failed = true;
            }
        }
    }

    fn write_line(&mut self, line: &[u8]) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = file.write_all(line) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write log line");
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_mut()
            && let Err(e) = file.flush()
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush log file");
        }
    }
}

/// Owner of the two log files.
///
/// Only the writer thread holds a `FileSink`, so rotation never races a write.
pub(crate) struct FileSink {
    main: StreamFile,
    warn: StreamFile,
    clock: Arc<dyn Clock>,
}

impl FileSink {
    /// Create the log directory and open both files in append mode.
    pub(crate) fn open(config: &FileLogConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(&config.log_path).map_err(|source| Error::Open {
            path: config.log_path.clone(),
            source,
        })?;

        let now = clock.now();
        let policy = RotationPolicy::new(config.log_split_type, config.log_split_size, now);
        let main = StreamFile::open(config.main_file_path(), policy.clone())?;
        let warn = StreamFile::open(config.warn_file_path(), policy)?;

        Ok(Self { main, warn, clock })
    }

    /// Append one formatted line for `record`, rotating its stream first if needed.
    ///
    /// Failures are reported through `tracing` and otherwise ignored.
    pub(crate) fn write(&mut self, record: &Record) {
        let stream = if record.is_warn_stream() {
            &mut self.warn
        } else {
            &mut self.main
        };
        if !stream.prepare(self.clock.as_ref()) {
            return;
        }
        let line = format!("{}\n", record);
        stream.write_line(line.as_bytes());
    }

    pub(crate) fn flush(&mut self) {
        self.main.flush();
        self.warn.flush();
    }
}

/// Drain the mailbox until it is closed or a shutdown marker arrives.
pub(crate) fn run(receiver: Receiver<Message>, mut sink: FileSink) {
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Record(record) => sink.write(&record),
            Message::Flush(ack) => {
                sink.flush();
                let _ = ack.send(());
            }
            Message::Shutdown => break,
        }
    }
    sink.flush();
    tracing::debug!("log writer stopped");
}
