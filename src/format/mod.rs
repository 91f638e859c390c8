//! FSEvents disk log format constants and low-level decoding.
//!
//! An inflated fseventsd log is a sequence of DLS pages. Every page starts
//! with a 12-byte header:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | signature, `1SLD` or `2SLD` on disk (`DLS1`/`DLS2` byte-reversed) |
//! | 4 | 4 | unknown |
//! | 8 | 4 | page length, u32 little-endian, counted from the page start |
//!
//! The header is followed by records, each a NUL-terminated path and a
//! fixed trailer:
//!
//! | Field | V1 | V2 |
//! |-------|----|----|
//! | event id (u64 LE) | 8 | 8 |
//! | flag mask (u32 BE) | 4 | 4 |
//! | node id (i64 LE) | - | 8 |

pub mod mask;
pub mod page;
pub mod record;

pub use mask::{EventMask, MASK_TABLE, MaskKind};
pub use page::{Page, PageHeader, scan_pages};
pub use record::{Record, RecordDecoder};

/// On-disk signature of a version 1 page (`DLS1` reversed).
pub const SIGNATURE_V1: &[u8; 4] = b"1SLD";

/// On-disk signature of a version 2 page (`DLS2` reversed), macOS 10.13+.
pub const SIGNATURE_V2: &[u8; 4] = b"2SLD";

/// Size of a page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 12;

/// Offset of the page length field inside the page header.
pub const PAGE_LENGTH_OFFSET: usize = 8;

/// DLS page format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DlsVersion {
    /// Pre-High Sierra records, no node id.
    V1,
    /// High Sierra and later records, with a node id.
    V2,
}

impl DlsVersion {
    /// Identifies the version from the 4 on-disk signature bytes.
    pub fn from_signature(signature: &[u8]) -> Option<Self> {
        if signature == SIGNATURE_V1 {
            Some(DlsVersion::V1)
        } else if signature == SIGNATURE_V2 {
            Some(DlsVersion::V2)
        } else {
            None
        }
    }

    /// Returns the on-disk signature.
    pub fn signature(self) -> &'static [u8; 4] {
        match self {
            DlsVersion::V1 => SIGNATURE_V1,
            DlsVersion::V2 => SIGNATURE_V2,
        }
    }

    /// Returns the canonical signature name (`DLS1` or `DLS2`).
    pub fn name(self) -> &'static str {
        match self {
            DlsVersion::V1 => "DLS1",
            DlsVersion::V2 => "DLS2",
        }
    }

    /// Returns the numeric version (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            DlsVersion::V1 => 1,
            DlsVersion::V2 => 2,
        }
    }

    /// Bytes following a path: the NUL terminator plus the fixed trailer.
    ///
    /// 13 for version 1, 21 for version 2.
    pub fn trailer_len(self) -> usize {
        match self {
            DlsVersion::V1 => 13,
            DlsVersion::V2 => 21,
        }
    }
}

impl std::fmt::Display for DlsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
