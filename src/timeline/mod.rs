//! Approximate dates for event ids.
//!
//! Event ids are issued in increasing order but carry no time. A timeline
//! is built once per archive from anchors, pairs of (event id, date):
//!
//! - dates embedded in the names of log files the system created (see
//!   [`patterns`]);
//! - for an archive with a trustworthy name, the bracketing pair
//!   `(0, Unknown)` and `(last event id, modification date)`.
//!
//! Anchors are sorted by event id and folded into [`TimeRange`]s. An anchor
//! whose date precedes the date carried forward is dropped, so the dates of
//! consecutive ranges never go backwards.
//!
//! # Example
//!
//! ```rust
//! use fseventsd::LogDate;
//! use fseventsd::timeline::{Anchor, Timeline};
//!
//! let timeline = Timeline::from_anchors(
//!     vec![
//!         Anchor::new(100, LogDate::new(2020, 1, 1)),
//!         Anchor::new(200, LogDate::new(2020, 1, 5)),
//!     ],
//!     Some(LogDate::new(2020, 2, 1)),
//! );
//!
//! assert_eq!(timeline.apply_date(150).to_string(), "2020.01.01 - 2020.01.05");
//! assert_eq!(timeline.apply_date(100).to_string(), "2020.01.01");
//! assert_eq!(timeline.apply_date(250).to_string(), "2020.02.01");
//! ```

pub mod patterns;

pub use patterns::{DATE_PATTERNS, DateFormat, DateMatch, DatePattern, find_dates};

use crate::timestamp::LogDate;

/// A correlation point between an event id and a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// The event id.
    pub event_id: u64,
    /// The date, `None` when unknown.
    pub date: Option<LogDate>,
}

impl Anchor {
    /// Creates an anchor with a known date.
    pub fn new(event_id: u64, date: LogDate) -> Self {
        Self {
            event_id,
            date: Some(date),
        }
    }

    /// Creates an anchor whose date is unknown.
    pub fn unknown(event_id: u64) -> Self {
        Self {
            event_id,
            date: None,
        }
    }
}

impl From<DateMatch> for Anchor {
    fn from(found: DateMatch) -> Self {
        Anchor::new(found.event_id, found.date)
    }
}

/// Interpolation unit between two consecutive kept anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Event id of the lower anchor.
    pub from_id: u64,
    /// Event id of the upper anchor.
    pub to_id: u64,
    /// Date of the lower anchor.
    pub from_date: Option<LogDate>,
    /// Date of the upper anchor.
    pub to_date: Option<LogDate>,
}

/// The answer to a date query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproxDate {
    /// No date could be determined.
    Unknown,
    /// A single day.
    Day(LogDate),
    /// Somewhere between two anchor dates; either end may be unknown.
    Range {
        /// Lower bound.
        from: Option<LogDate>,
        /// Upper bound.
        to: Option<LogDate>,
    },
}

impl ApproxDate {
    fn single(date: Option<LogDate>) -> Self {
        date.map_or(ApproxDate::Unknown, ApproxDate::Day)
    }

    /// Returns `true` for [`ApproxDate::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, ApproxDate::Unknown)
    }
}

fn write_date(f: &mut std::fmt::Formatter<'_>, date: Option<LogDate>) -> std::fmt::Result {
    match date {
        Some(date) => write!(f, "{date}"),
        None => f.write_str("Unknown"),
    }
}

impl std::fmt::Display for ApproxDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApproxDate::Unknown => f.write_str("Unknown"),
            ApproxDate::Day(date) => write!(f, "{date}"),
            ApproxDate::Range { from, to } => {
                write_date(f, *from)?;
                f.write_str(" - ")?;
                write_date(f, *to)
            }
        }
    }
}

/// Folded anchors of one archive, queried read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    ranges: Vec<TimeRange>,
    fallback: Option<LogDate>,
}

impl Timeline {
    /// Builds a timeline from anchors in any order.
    ///
    /// `fallback` is the modification date answered for ids past the last
    /// anchor, or for every id when there are no anchors. Pass `None` when
    /// the policy is off or the archive is carved.
    pub fn from_anchors(mut anchors: Vec<Anchor>, fallback: Option<LogDate>) -> Self {
        anchors.sort_by_key(|a| a.event_id);

        let mut ranges = Vec::with_capacity(anchors.len());
        let mut prev_id = 0u64;
        let mut prev_date: Option<LogDate> = None;

        for anchor in anchors {
            let goes_back = match (prev_date, anchor.date) {
                (Some(_), None) => true,
                (Some(prev), Some(cur)) => cur < prev,
                (None, _) => false,
            };
            if goes_back {
                log::debug!(
                    "Dropping anchor for event id {} dated {}: earlier than {}",
                    anchor.event_id,
                    ApproxDate::single(anchor.date),
                    ApproxDate::single(prev_date),
                );
                continue;
            }
            ranges.push(TimeRange {
                from_id: prev_id,
                to_id: anchor.event_id,
                from_date: prev_date,
                to_date: anchor.date,
            });
            prev_id = anchor.event_id;
            prev_date = anchor.date;
        }

        Self { ranges, fallback }
    }

    /// Builds the timeline of one archive.
    ///
    /// `buffer` is mined for date-bearing paths. `seed` is the last event id
    /// and modification date of an archive with a trustworthy name; it
    /// brackets the mined anchors and is ignored when none were found.
    pub fn correlate(
        buffer: &[u8],
        seed: Option<(u64, LogDate)>,
        fallback: Option<LogDate>,
    ) -> Self {
        let mut anchors: Vec<Anchor> = find_dates(buffer).into_iter().map(Anchor::from).collect();
        log::debug!("Found {} date anchors", anchors.len());

        if let Some((last_id, modified)) = seed.filter(|_| !anchors.is_empty()) {
            anchors.push(Anchor::unknown(0));
            anchors.push(Anchor::new(last_id, modified));
        }
        Self::from_anchors(anchors, fallback)
    }

    /// Returns the folded ranges in event id order.
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// Returns the modification-date fallback, if enabled.
    pub fn fallback(&self) -> Option<LogDate> {
        self.fallback
    }

    /// Returns `true` if no anchor survived folding.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the approximate date of `event_id`.
    ///
    /// Ranges are walked in order. An id strictly inside a range answers the
    /// range (or its single date when both ends agree); an id equal to an end
    /// answers that end's date. An id at or past the last upper end answers
    /// the fallback. Anything else is [`ApproxDate::Unknown`].
    pub fn apply_date(&self, event_id: u64) -> ApproxDate {
        let Some(last) = self.ranges.len().checked_sub(1) else {
            return ApproxDate::single(self.fallback);
        };

        for (i, range) in self.ranges.iter().enumerate() {
            if event_id > range.from_id && event_id < range.to_id {
                return if range.from_date == range.to_date {
                    ApproxDate::single(range.from_date)
                } else {
                    ApproxDate::Range {
                        from: range.from_date,
                        to: range.to_date,
                    }
                };
            }
            if event_id == range.from_id {
                return ApproxDate::single(range.from_date);
            }
            if event_id == range.to_id {
                return ApproxDate::single(range.to_date);
            }
            if i == last && event_id >= range.to_id && self.fallback.is_some() {
                return ApproxDate::single(self.fallback);
            }
        }
        ApproxDate::Unknown
    }
}
