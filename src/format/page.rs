//! DLS page discovery.
//!
//! Pages are chained: each header's length field gives the offset of the
//! next header. Scanning starts at offset 0 and stops at the first span that
//! does not carry a valid page header, yielding the prefix of valid pages.

use super::{DlsVersion, PAGE_HEADER_SIZE, PAGE_LENGTH_OFFSET};

/// A decoded page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Format version from the signature.
    pub version: DlsVersion,
    /// The 4 bytes between signature and length; meaning unknown.
    pub unknown: u32,
    /// Declared page length, counted from the page start.
    pub page_len: u32,
}

impl PageHeader {
    /// Decodes a page header from the start of `data`.
    ///
    /// Returns `None` if fewer than 12 bytes are available or the signature
    /// is not a DLS signature.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = data.get(..PAGE_HEADER_SIZE)?;
        let version = DlsVersion::from_signature(&header[..4])?;
        let unknown = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let len = &header[PAGE_LENGTH_OFFSET..PAGE_LENGTH_OFFSET + 4];
        let page_len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]);
        Some(Self {
            version,
            unknown,
            page_len,
        })
    }
}

/// A version-tagged span of the inflated archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Format version of the records in this page.
    pub version: DlsVersion,
    /// The header the page was found by.
    pub header: PageHeader,
    /// Absolute start offset (the page header).
    pub start: u64,
    /// Absolute end offset, exclusive.
    pub end: u64,
    /// The declared length ran past the end of the buffer and was clamped.
    pub truncated: bool,
}

impl Page {
    /// Returns the page length in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` if the page has no bytes.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Returns the page bytes within `buffer`.
    pub fn bytes<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.start as usize..self.end as usize]
    }
}

/// Why page scanning stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// The last page ended exactly at the end of the buffer.
    EndOfBuffer,
    /// No DLS signature at this offset.
    BadSignature {
        /// Offset of the rejected header.
        offset: u64,
    },
    /// The length field is missing or shorter than a page header.
    MalformedLength {
        /// Offset of the rejected header.
        offset: u64,
    },
    /// The declared length ran past the buffer; the page was clamped.
    PastEnd {
        /// Offset of the clamped page.
        offset: u64,
    },
}

/// Iterator over the chained pages of an inflated archive.
#[derive(Debug, Clone)]
pub struct PageScanner<'a> {
    buffer: &'a [u8],
    offset: usize,
    stop: Option<ScanStop>,
}

impl<'a> PageScanner<'a> {
    /// Creates a scanner positioned at offset 0.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            stop: None,
        }
    }

    /// Returns why scanning stopped, once the iterator is exhausted.
    pub fn stop_reason(&self) -> Option<ScanStop> {
        self.stop
    }

    fn halt(&mut self, reason: ScanStop) -> Option<Page> {
        self.stop = Some(reason);
        None
    }
}

impl Iterator for PageScanner<'_> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        if self.stop.is_some() {
            return None;
        }
        if self.offset == self.buffer.len() {
            return self.halt(ScanStop::EndOfBuffer);
        }

        let start = self.offset;
        if self.buffer.len() - start < PAGE_HEADER_SIZE {
            log::warn!("Error in length of page when finding page headers at offset {start:#x}");
            return self.halt(ScanStop::MalformedLength {
                offset: start as u64,
            });
        }
        let Some(header) = PageHeader::parse(&self.buffer[start..]) else {
            log::warn!("No DLS page signature at offset {start:#x}");
            return self.halt(ScanStop::BadSignature {
                offset: start as u64,
            });
        };

        let page_len = header.page_len as usize;
        if page_len < PAGE_HEADER_SIZE {
            log::warn!("Page length {page_len} at offset {start:#x} is shorter than its header");
            return self.halt(ScanStop::MalformedLength {
                offset: start as u64,
            });
        }

        let declared_end = start.saturating_add(page_len);
        let truncated = declared_end > self.buffer.len();
        let end = if truncated {
            log::warn!(
                "Page at offset {start:#x} declares {page_len} bytes but only {} remain",
                self.buffer.len() - start
            );
            self.stop = Some(ScanStop::PastEnd {
                offset: start as u64,
            });
            self.buffer.len()
        } else {
            declared_end
        };

        self.offset = end;
        Some(Page {
            version: header.version,
            header,
            start: start as u64,
            end: end as u64,
            truncated,
        })
    }
}

/// Scans `buffer` for chained DLS pages.
///
/// An empty result means the buffer is not a recognized FSEvents log.
pub fn scan_pages(buffer: &[u8]) -> Vec<Page> {
    PageScanner::new(buffer).collect()
}
