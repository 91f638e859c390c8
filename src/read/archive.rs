//! Archive inputs and their naming metadata.
//!
//! fseventsd names each log after the last event id it holds, written as 16
//! lowercase hex digits (`0000000000027d79`). A log whose name does not
//! follow this convention is treated as carved: its name and modification
//! time say nothing about its contents.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::Result;
use crate::timestamp::LogDate;

/// Identifies where an archive came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSource {
    /// File name of the archive.
    pub name: String,
    /// Full path, when the archive was read from disk.
    pub path: Option<String>,
    /// Modification time of the archive file.
    pub modified: Option<DateTime<Utc>>,
}

impl ArchiveSource {
    /// Creates a source known only by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            modified: None,
        }
    }

    /// Sets the full path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the modification time.
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Returns the path if known, the name otherwise.
    pub fn display_name(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// One compressed archive, read fully into memory.
#[derive(Debug, Clone)]
pub struct ArchiveInput {
    /// Where the bytes came from.
    pub source: ArchiveSource,
    /// The gzip-compressed log.
    pub data: Vec<u8>,
}

impl ArchiveInput {
    /// Creates an input from bytes.
    pub fn new(source: ArchiveSource, data: Vec<u8>) -> Self {
        Self { source, data }
    }

    /// Reads a file, capturing its name and modification time.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let modified = std::fs::metadata(path)?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut source = ArchiveSource::new(name).with_path(path.to_string_lossy());
        source.modified = modified;
        Ok(Self { source, data })
    }
}

/// Returns the last event id encoded in an archive name.
///
/// The name must be exactly 16 hex digits.
pub fn name_event_id(name: &str) -> Option<u64> {
    if name.len() != 16 || !name.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(name, 16).ok()
}

/// An inflated archive ready for page scanning.
#[derive(Debug, Clone)]
pub struct Archive {
    /// The inflated log.
    pub data: Vec<u8>,
    /// Where it came from.
    pub source: ArchiveSource,
    /// The name does not follow the event id convention.
    pub carved: bool,
    /// Last event id taken from the name.
    pub last_event_id: Option<u64>,
}

impl Archive {
    /// Wraps an inflated buffer, classifying it by its source name.
    pub fn new(source: ArchiveSource, data: Vec<u8>) -> Self {
        let last_event_id = name_event_id(&source.name);
        Self {
            data,
            carved: last_event_id.is_none(),
            last_event_id,
            source,
        }
    }

    /// Returns the calendar day of the source modification time.
    pub fn modification_date(&self) -> Option<LogDate> {
        self.source.modified.map(LogDate::from)
    }

    /// Returns the timeline fallback date under the given policy.
    ///
    /// Carved archives never have one.
    pub fn fallback_date(&self, use_modification_date: bool) -> Option<LogDate> {
        if self.carved || !use_modification_date {
            return None;
        }
        self.modification_date()
    }

    /// Returns the `(last event id, modification date)` timeline seed.
    pub fn timeline_seed(&self, use_modification_date: bool) -> Option<(u64, LogDate)> {
        let date = self.fallback_date(use_modification_date)?;
        Some((self.last_event_id?, date))
    }
}
