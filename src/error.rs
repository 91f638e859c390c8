//! Error types for FSEvents log parsing.
//!
//! This module provides the [`Error`] enum which represents every failure
//! mode of the parser, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Granularity
//!
//! No error in this crate is fatal to a multi-archive run. Errors fall into
//! two groups:
//!
//! | Group | Variants | Effect |
//! |-------|----------|--------|
//! | Archive-fatal | [`Decompression`][Error::Decompression], [`TrailerMismatch`][Error::TrailerMismatch], [`NoPagesFound`][Error::NoPagesFound], [`ResourceLimitExceeded`][Error::ResourceLimitExceeded], [`Io`][Error::Io] | The archive is skipped, the batch continues |
//! | Record-level | [`RecordTruncated`][Error::RecordTruncated], [`RecordInvalid`][Error::RecordInvalid], [`UnscannedTail`][Error::UnscannedTail] | Decoding stops early, records already decoded are kept |
//!
//! Record-level errors are never returned as `Err` by
//! [`parse_archive`](crate::read::parse_archive); they are collected in
//! [`ParseSummary::issues`](crate::read::ParseSummary::issues).
//!
//! ```rust
//! use fseventsd::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     if error.is_fatal_for_archive() {
//!         "archive skipped"
//!     } else {
//!         "archive partially parsed"
//!     }
//! }
//! ```

use std::io;

use crate::recovery::InvalidReason;

/// The main error type for FSEvents parsing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading an input or writing to a sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The compressed container cannot be decoded at all.
    ///
    /// Returned for a bad gzip magic, an unsupported compression method, a
    /// truncated gzip header or a corrupt deflate block. Trailer problems are
    /// only reported here in strict mode.
    #[error("decompression failed: {reason}")]
    Decompression {
        /// A description of what could not be decoded.
        reason: String,
    },

    /// The gzip trailer does not match the inflated data (strict mode only).
    #[error(
        "gzip trailer mismatch: expected crc {expected_crc:#010x} / size {expected_size}, got crc {actual_crc:#010x} / size {actual_size}"
    )]
    TrailerMismatch {
        /// CRC32 stored in the trailer.
        expected_crc: u32,
        /// CRC32 of the inflated data.
        actual_crc: u32,
        /// ISIZE stored in the trailer.
        expected_size: u32,
        /// Inflated size modulo 2^32.
        actual_size: u32,
    },

    /// The inflated archive exceeds the configured size limit.
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// The decompressed buffer does not start with a DLS page header.
    ///
    /// The buffer is not a recognized FSEvents log; the archive is skipped.
    #[error("no DLS page header found in '{source_name}'")]
    NoPagesFound {
        /// Name of the archive that was scanned.
        source_name: String,
    },

    /// A page ended in the middle of a record.
    ///
    /// Typical of carved data. Decoding of the page stops, prior records
    /// are kept.
    #[error("record truncated at offset {offset:#x}")]
    RecordTruncated {
        /// Absolute archive offset where the incomplete record starts.
        offset: u64,
    },

    /// A record failed the consistency heuristics, or carries event id 0.
    ///
    /// Decoding of the whole archive stops, prior records are kept.
    #[error("invalid record (event id {event_id}) at offset {offset:#x}: {reason}")]
    RecordInvalid {
        /// Absolute archive offset of the record.
        offset: u64,
        /// The event id of the rejected record.
        event_id: u64,
        /// Which heuristic rejected the record.
        reason: InvalidReason,
    },

    /// Page scanning stopped before the end of the buffer.
    ///
    /// The bytes from `offset` on carry no valid page header and were not
    /// decoded; the pages before them are kept.
    #[error("{unscanned} bytes at offset {offset:#x} are not a DLS page")]
    UnscannedTail {
        /// Offset of the rejected page header.
        offset: u64,
        /// Number of bytes left undecoded.
        unscanned: u64,
    },

    /// An emitted record could not be serialized by a sink.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The worker pool for batch parsing could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Returns `true` if this error causes the whole archive to be skipped.
    ///
    /// Record-level errors return `false`: they only cut decoding short.
    pub fn is_fatal_for_archive(&self) -> bool {
        !matches!(
            self,
            Error::RecordTruncated { .. }
                | Error::RecordInvalid { .. }
                | Error::UnscannedTail { .. }
        )
    }

    /// Returns `true` if this error indicates damaged log data.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::RecordTruncated { .. }
                | Error::RecordInvalid { .. }
                | Error::UnscannedTail { .. }
                | Error::TrailerMismatch { .. }
                | Error::Decompression { .. }
        )
    }

    /// Returns the archive offset associated with this error, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::RecordTruncated { offset } => Some(*offset),
            Error::RecordInvalid { offset, .. } => Some(*offset),
            Error::UnscannedTail { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// A specialized Result type for FSEvents operations.
pub type Result<T> = std::result::Result<T, Error>;
