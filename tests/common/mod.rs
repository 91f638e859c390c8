#![allow(dead_code)]
//! Shared test utilities for building synthetic fseventsd logs.

use std::io::Write;

use chrono::{DateTime, TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;

use fseventsd::read::{ArchiveInput, ArchiveSource};
use fseventsd::{DlsVersion, EventMask};

/// File created: the mask of an ordinary creation event.
pub const FILE_CREATED: u32 = EventMask::FILE_EVENT | EventMask::CREATED;

/// Folder created, as fseventsd writes it.
pub const FOLDER_CREATED: u32 =
    EventMask::FOLDER_EVENT | EventMask::CREATED | EventMask::FOLDER_CREATED;

/// File modified.
pub const FILE_MODIFIED: u32 = EventMask::FILE_EVENT | 0x1000_0000;

/// Builder for one DLS page.
#[derive(Debug, Clone)]
pub struct PageBuilder {
    version: DlsVersion,
    body: Vec<u8>,
}

impl PageBuilder {
    /// An empty `1SLD` page.
    pub fn v1() -> Self {
        Self {
            version: DlsVersion::V1,
            body: Vec::new(),
        }
    }

    /// An empty `2SLD` page.
    pub fn v2() -> Self {
        Self {
            version: DlsVersion::V2,
            body: Vec::new(),
        }
    }

    /// Appends a record. DLS2 records get the event id as node id.
    pub fn record(mut self, path: &str, event_id: u64, mask: u32) -> Self {
        self.body
            .extend_from_slice(&record_bytes(self.version, path.as_bytes(), event_id, mask));
        self
    }

    /// Appends raw bytes to the page body.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Returns the page with its 12-byte header.
    pub fn build(&self) -> Vec<u8> {
        let mut data = self.version.signature().to_vec();
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&((12 + self.body.len()) as u32).to_le_bytes());
        data.extend_from_slice(&self.body);
        data
    }
}

/// Encodes one record body for `version`.
pub fn record_bytes(version: DlsVersion, path: &[u8], event_id: u64, mask: u32) -> Vec<u8> {
    let mut data = path.to_vec();
    data.push(0);
    data.extend_from_slice(&event_id.to_le_bytes());
    data.extend_from_slice(&mask.to_be_bytes());
    if version == DlsVersion::V2 {
        data.extend_from_slice(&(event_id as i64).to_le_bytes());
    }
    data
}

/// Concatenates pages into an inflated log.
pub fn log(pages: &[PageBuilder]) -> Vec<u8> {
    pages.iter().flat_map(PageBuilder::build).collect()
}

/// Gzip-compresses `data` with a complete trailer.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Gzip-compresses `data` and drops the 8-byte trailer, like a carved log.
pub fn gzip_without_trailer(data: &[u8]) -> Vec<u8> {
    let mut compressed = gzip(data);
    compressed.truncate(compressed.len() - 8);
    compressed
}

/// A fixed modification time: 2021-06-15 12:00:00 UTC.
pub fn modified_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 15, 12, 0, 0).unwrap()
}

/// An input named `name` holding the gzip of `inflated`, without mtime.
pub fn input(name: &str, inflated: &[u8]) -> ArchiveInput {
    ArchiveInput::new(ArchiveSource::new(name), gzip(inflated))
}

/// An input named `name` holding the gzip of `inflated`, with [`modified_time`].
pub fn input_modified(name: &str, inflated: &[u8]) -> ArchiveInput {
    ArchiveInput::new(
        ArchiveSource::new(name).with_modified(modified_time()),
        gzip(inflated),
    )
}

/// A well-formed three-page log mixing both versions, event ids 1 to 6.
pub fn sample_log() -> Vec<u8> {
    log(&[
        PageBuilder::v1()
            .record("Users/alice/report.txt", 1, FILE_CREATED)
            .record("Users/alice/Documents", 2, FOLDER_CREATED),
        PageBuilder::v2()
            .record("Users/alice/report.txt", 3, FILE_MODIFIED)
            .record("private/tmp/a.lock", 4, FILE_CREATED),
        PageBuilder::v2()
            .record("Users/alice/b.txt", 5, FILE_CREATED)
            .record("", 6, FILE_MODIFIED),
    ])
}
