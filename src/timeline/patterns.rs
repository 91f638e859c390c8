//! Log paths that carry their creation date in the file name.
//!
//! Each row of [`DATE_PATTERNS`] is a literal path prefix, a regex for the
//! dated tail of the name, and the format of the date that starts right
//! after the prefix. All rows are compiled into one byte regex. After the
//! name it skips nine bytes of any value, where a record keeps its NUL
//! terminator and 8-byte event id, then requires a first mask byte that
//! carries the `Created` flag, so only creation events become anchors.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::timestamp::LogDate;

/// How the date inside a matched name is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `yyyy.mm.dd`
    Dotted,
    /// `yyyymmdd`
    Compact,
}

impl DateFormat {
    /// Length of the date text in bytes.
    pub fn width(self) -> usize {
        match self {
            DateFormat::Dotted => 10,
            DateFormat::Compact => 8,
        }
    }
}

/// One row of the date-bearing path table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePattern {
    /// Literal path prefix; the date starts right after it.
    pub prefix: &'static str,
    /// Regex for the rest of the name.
    pub tail: &'static str,
    /// Format of the embedded date.
    pub format: DateFormat,
}

impl DatePattern {
    /// Offset of the date from the start of the match.
    pub fn date_offset(&self) -> usize {
        self.prefix.len()
    }

    /// Extracts the date from matched path bytes.
    pub fn parse_date(&self, matched: &[u8]) -> Option<LogDate> {
        let start = self.date_offset();
        let text = matched.get(start..start + self.format.width())?;
        match self.format {
            DateFormat::Dotted => LogDate::parse_dotted(text),
            DateFormat::Compact => LogDate::parse_compact(text),
        }
    }
}

const DOTTED_ASL: &str = r"[0-9]{4}\.[0-9]{2}\.[0-9]{2}\.asl";

/// Date-bearing log paths, in match priority order.
pub static DATE_PATTERNS: [DatePattern; 8] = [
    DatePattern {
        prefix: "private/var/log/asl/",
        tail: r"[0-9]{4}\.[0-9]{2}\.[0-9]{2}\.[0-z]{2,8}\.asl",
        format: DateFormat::Dotted,
    },
    DatePattern {
        prefix: "mobile/Library/Logs/CrashReporter/DiagnosticLogs/security.log.",
        tail: r"[0-9]{8}T[0-9]{6}Z",
        format: DateFormat::Compact,
    },
    DatePattern {
        prefix: "private/var/log/asl/Logs/aslmanager.",
        tail: r"[0-9]{8}T[0-9]{6}-[0-9]{2}",
        format: DateFormat::Compact,
    },
    DatePattern {
        prefix: "private/var/log/DiagnosticMessages/",
        tail: DOTTED_ASL,
        format: DateFormat::Dotted,
    },
    DatePattern {
        prefix: "private/var/log/com.apple.clouddocs.asl/",
        tail: DOTTED_ASL,
        format: DateFormat::Dotted,
    },
    DatePattern {
        prefix: "private/var/log/powermanagement/",
        tail: DOTTED_ASL,
        format: DateFormat::Dotted,
    },
    DatePattern {
        prefix: "private/var/log/asl/AUX.",
        tail: r"[0-9]{4}\.[0-9]{2}\.[0-9]{2}/[0-9]{9}",
        format: DateFormat::Dotted,
    },
    DatePattern {
        prefix: "private/var/audit/",
        tail: r"[0-9]{14}\.not_terminated",
        format: DateFormat::Compact,
    },
];

/// First mask bytes accepted for an anchor: `Created` plus common companions.
pub const CREATED_FLAG_BYTES: [u8; 14] = [
    0x01, 0x11, 0x21, 0x31, 0x41, 0x51, 0x61, 0x05, 0x15, 0x25, 0x35, 0x45, 0x55, 0x65,
];

/// Bytes skipped between the name and the mask: the NUL and the event id slot.
const ID_GAP: usize = 9;

static ANCHOR_REGEX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    let rows: Vec<String> = DATE_PATTERNS
        .iter()
        .map(|p| format!("({}{})", regex::escape(p.prefix), p.tail))
        .collect();
    let flags: String = CREATED_FLAG_BYTES
        .iter()
        .map(|b| format!(r"\x{b:02X}"))
        .collect();
    Regex::new(&format!(
        r"(?s-u)(?:{}).{{{ID_GAP}}}[{flags}]",
        rows.join("|")
    ))
});

/// A date-bearing path found in the inflated archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    /// Absolute offset of the path start.
    pub offset: u64,
    /// Event id of the record the path belongs to.
    pub event_id: u64,
    /// Date taken from the file name.
    pub date: LogDate,
    /// The table row that matched.
    pub pattern: &'static DatePattern,
}

/// Scans `buffer` for date-bearing paths of creation events.
///
/// Matches are returned in buffer order and do not overlap.
pub fn find_dates(buffer: &[u8]) -> Vec<DateMatch> {
    let regex = match &*ANCHOR_REGEX {
        Ok(regex) => regex,
        Err(e) => {
            log::error!("Date pattern table failed to compile: {e}");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for caps in regex.captures_iter(buffer) {
        let Some(row) = (1..caps.len()).find(|&i| caps.get(i).is_some()) else {
            continue;
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let pattern = &DATE_PATTERNS[row - 1];
        let Some(date) = pattern.parse_date(whole.as_bytes()) else {
            continue;
        };

        let id_end = whole.end() - 1;
        let mut id_bytes = [0u8; 8];
        id_bytes.copy_from_slice(&buffer[id_end - 8..id_end]);

        found.push(DateMatch {
            offset: whole.start() as u64,
            event_id: u64::from_le_bytes(id_bytes),
            date,
            pattern,
        });
    }
    found
}
