use std::path::{Path, PathBuf};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::config::SplitType;

/// Archive suffix for size rotation. Several rotations can happen per hour, so seconds are kept.
const SIZE_SUFFIX_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day][hour][minute][second]");

/// Parse a size string with an optional unit (K/M/G, case-insensitive). Bare numbers are bytes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let Some(last) = s.chars().last() else {
        return Err("empty size string".to_string());
    };

    let (num_str, multiplier) = if last.is_alphabetic() {
        let multiplier = match last.to_ascii_uppercase() {
            'K' => 1024,
            'M' => 1024 * 1024,
            'G' => 1024 * 1024 * 1024,
            unit => return Err(format!("invalid unit: {}, supported: K/M/G", unit)),
        };
        (&s[..s.len() - last.len_utf8()], multiplier)
    } else {
        (s, 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| "size too large".to_string())
}

/// The wall-clock hour a file was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourMark {
    date: Date,
    hour: u8,
}

impl HourMark {
    fn of(now: OffsetDateTime) -> Self {
        Self {
            date: now.date(),
            hour: now.hour(),
        }
    }

    /// `YYYYMMDDHH`
    fn suffix(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day(),
            self.hour
        )
    }
}

/// Per-stream rotation decision.
///
/// Each stream (normal and warn) owns one policy, so an hour boundary archives
/// both files independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Rotate when the wall-clock hour changes.
    ByHour {
        /// Hour the active file belongs to.
        last_split: HourMark,
    },
    /// Rotate when the file grows past `max_size` bytes.
    BySize {
        /// Size threshold in bytes.
        max_size: u64,
    },
}

impl RotationPolicy {
    /// Create the policy for a newly opened stream.
    pub fn new(split_type: SplitType, max_size: u64, now: OffsetDateTime) -> Self {
        match split_type {
            SplitType::Hour => Self::ByHour {
                last_split: HourMark::of(now),
            },
            SplitType::Size => Self::BySize { max_size },
        }
    }

    /// Decide whether the active file must be archived before the next write.
    ///
    /// Returns the archive suffix when it must. `current_size` is only consulted
    /// in size mode; `None` means the size is unknown and no rotation happens.
    /// In hour mode the new hour is recorded before returning, whether or not
    /// the caller manages to rotate.
    pub fn check(
        &mut self,
        now: OffsetDateTime,
        current_size: impl FnOnce() -> Option<u64>,
    ) -> Option<String> {
        match self {
            Self::ByHour { last_split } => {
                let mark = HourMark::of(now);
                if mark == *last_split {
                    return None;
                }
                let suffix = last_split.suffix();
                *last_split = mark;
                Some(suffix)
            }
            Self::BySize { max_size } => {
                let size = current_size()?;
                if size <= *max_size {
                    return None;
                }
                now.format(SIZE_SUFFIX_FORMAT).ok()
            }
        }
    }
}

/// Archive name for `active`: `{active}_{suffix}`.
///
/// If that name is taken, `.1`, `.2`, ... is appended so an earlier archive is
/// never overwritten.
pub fn archive_path(active: &Path, suffix: &str) -> PathBuf {
    let base = format!("{}_{}", active.display(), suffix);
    let candidate = PathBuf::from(&base);
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| PathBuf::from(format!("{}.{}", base, n)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
