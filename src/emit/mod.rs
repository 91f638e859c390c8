//! Output records and their delivery.
//!
//! Every decoded record that passes validation becomes one [`EventRecord`],
//! pushed to an [`EventSink`] as soon as it is decoded. Nothing is buffered
//! per archive.

mod sink;

pub use sink::{CountingSink, EventSink, JsonLinesSink, VecSink};

use serde::Serialize;

use crate::Result;
use crate::format::Record;
use crate::read::ArchiveSource;
use crate::timeline::ApproxDate;

/// Value of [`EventRecord::application`].
pub const APPLICATION: &str = "fseventsd";

/// Path text emitted for records with an empty path.
pub const EMPTY_PATH: &str = "NULL";

/// One filesystem-change event as written to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Event id.
    pub id: u64,
    /// Event id as `"<16 hex digits> (<decimal>)"`.
    pub id_hex: String,
    /// Full path, or `NULL` when the record has none.
    pub fullpath: String,
    /// Last component of [`fullpath`](Self::fullpath).
    pub filename: String,
    /// Type labels, e.g. `FileEvent;`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Flag labels, e.g. `Created;Modified;`.
    pub flags: String,
    /// Approximate date, accurate to about one day.
    #[serde(rename = "approx_dates_plus_minus_one_day")]
    pub approx_dates: String,
    /// Flag mask as `0x` and 8 hex digits.
    pub mask: String,
    /// File system node id (DLS2 only).
    pub node_id: Option<i64>,
    /// Absolute offset just past the record in the inflated archive.
    pub record_end_offset: u64,
    /// Source path, or name when no path is known.
    pub source: String,
    /// Source modification time, RFC 3339.
    pub source_modified_time: Option<String>,
    /// Always [`APPLICATION`].
    pub application: &'static str,
}

impl EventRecord {
    /// Assembles the output record for one decoded record.
    pub fn new(record: &Record, date: ApproxDate, source: &ArchiveSource) -> Self {
        let (fullpath, filename) = if record.path.is_empty() {
            (EMPTY_PATH.to_string(), EMPTY_PATH.to_string())
        } else {
            (record.path.clone(), record.file_name().to_string())
        };

        Self {
            id: record.event_id,
            id_hex: format!("{} ({})", record.event_id_hex(), record.event_id),
            fullpath,
            filename,
            event_type: record.mask.type_labels(),
            flags: record.mask.flag_labels(),
            approx_dates: date.to_string(),
            mask: format!("{:#010x}", record.mask),
            node_id: record.node_id,
            record_end_offset: record.end_offset,
            source: source.display_name().to_string(),
            source_modified_time: source.modified.map(|t| t.to_rfc3339()),
            application: APPLICATION,
        }
    }

    /// Display name of the event, the same text as [`id_hex`](Self::id_hex).
    pub fn name(&self) -> &str {
        &self.id_hex
    }
}

/// Streams the records of one archive to a sink.
pub struct EventEmitter<'a, S: EventSink + ?Sized> {
    source: &'a ArchiveSource,
    sink: &'a S,
    emitted: usize,
}

impl<'a, S: EventSink + ?Sized> EventEmitter<'a, S> {
    /// Creates an emitter for records of `source`.
    pub fn new(source: &'a ArchiveSource, sink: &'a S) -> Self {
        Self {
            source,
            sink,
            emitted: 0,
        }
    }

    /// Assembles and appends one record.
    pub fn emit(&mut self, record: &Record, date: ApproxDate) -> Result<()> {
        self.sink
            .append(&EventRecord::new(record, date, self.source))?;
        self.emitted += 1;
        Ok(())
    }

    /// Number of records appended so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}
