//! Calendar-day dates for timeline anchors.
//!
//! fseventsd records carry no timestamp of their own. The dates this crate
//! works with come from two places: date fragments embedded in log file
//! names (`2019.03.14` or `20190314`) and the modification time of the
//! archive file. Both are reduced to a calendar day, [`LogDate`], which
//! renders as `yyyy.mm.dd`.
//!
//! # Example
//!
//! ```rust
//! use fseventsd::LogDate;
//!
//! let dotted = LogDate::parse_dotted(b"2019.03.14").unwrap();
//! let compact = LogDate::parse_compact(b"20190314").unwrap();
//! assert_eq!(dotted, compact);
//! assert_eq!(dotted.to_string(), "2019.03.14");
//! ```

use chrono::{DateTime, Datelike, Utc};

/// A calendar day as written in log file names.
///
/// Ordering is chronological. Values are taken as found: a fragment such as
/// `2019.13.40` is accepted, since its only use is ordering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogDate {
    year: u16,
    month: u8,
    day: u8,
}

impl LogDate {
    /// Creates a date from its components.
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Parses `yyyy.mm.dd`.
    pub fn parse_dotted(text: &[u8]) -> Option<Self> {
        if text.len() != 10 || text[4] != b'.' || text[7] != b'.' {
            return None;
        }
        Some(Self {
            year: digits(&text[0..4])? as u16,
            month: digits(&text[5..7])? as u8,
            day: digits(&text[8..10])? as u8,
        })
    }

    /// Parses `yyyymmdd`.
    pub fn parse_compact(text: &[u8]) -> Option<Self> {
        if text.len() != 8 {
            return None;
        }
        Some(Self {
            year: digits(&text[0..4])? as u16,
            month: digits(&text[4..6])? as u8,
            day: digits(&text[6..8])? as u8,
        })
    }

    /// Returns the year.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month (1-12 in well-formed data).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Returns the day of month (1-31 in well-formed data).
    pub fn day(&self) -> u8 {
        self.day
    }
}

fn digits(text: &[u8]) -> Option<u32> {
    text.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

impl From<DateTime<Utc>> for LogDate {
    fn from(time: DateTime<Utc>) -> Self {
        Self {
            year: time.year().clamp(0, 9999) as u16,
            month: time.month() as u8,
            day: time.day() as u8,
        }
    }
}

impl std::fmt::Display for LogDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}.{:02}.{:02}", self.year, self.month, self.day)
    }
}
