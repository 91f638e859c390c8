//! Container decompression for FSEvents logs.
//!
//! fseventsd writes every log as a single-member gzip file. Logs recovered by
//! data carving are frequently cut short, so the gzip trailer (CRC32 and
//! ISIZE) may be missing, or the deflate stream itself may stop mid-block.
//!
//! [`decompress`] takes the tolerance as an explicit [`DecompressOptions`]
//! argument on every call. No decoder state is shared between calls, so
//! archives can be inflated concurrently with different settings.
//!
//! # Example
//!
//! ```rust
//! use fseventsd::codec::{DecompressOptions, decompress};
//!
//! // A gzip member holding "hi", with its trailer chopped off.
//! let carved = [
//!     0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff,
//!     0xcb, 0xc8, 0x04, 0x00,
//! ];
//! let out = decompress(&carved, &DecompressOptions::tolerant()).unwrap();
//! assert_eq!(out.data, b"hi");
//! assert!(!out.trailer.is_verified());
//!
//! assert!(decompress(&carved, &DecompressOptions::strict()).is_err());
//! ```

mod gzip;

pub use gzip::{GzipHeader, parse_header};

use crate::{Error, Result};

/// Default cap on the size of one inflated archive (256 MiB).
pub const DEFAULT_MAX_OUTPUT: usize = 256 * 1024 * 1024;

/// Options for a single decompression call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressOptions {
    /// Accept a missing or wrong trailer and a truncated deflate stream.
    pub tolerate_missing_trailer: bool,
    /// Maximum number of inflated bytes.
    pub max_output: usize,
}

impl Default for DecompressOptions {
    fn default() -> Self {
        Self::tolerant()
    }
}

impl DecompressOptions {
    /// Options that accept carved, partially surviving streams.
    pub fn tolerant() -> Self {
        Self {
            tolerate_missing_trailer: true,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }

    /// Options that require an intact stream with a matching trailer.
    pub fn strict() -> Self {
        Self {
            tolerate_missing_trailer: false,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }

    /// Sets whether trailer problems are tolerated.
    pub fn tolerate_missing_trailer(mut self, tolerate: bool) -> Self {
        self.tolerate_missing_trailer = tolerate;
        self
    }

    /// Sets the inflated size limit.
    pub fn max_output(mut self, limit: usize) -> Self {
        self.max_output = limit;
        self
    }
}

/// State of the gzip trailer after inflating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerStatus {
    /// CRC32 and ISIZE were present and matched.
    Verified,
    /// The deflate stream ended but fewer than 8 trailer bytes followed.
    Missing,
    /// The trailer was present but did not match the inflated data.
    Mismatch {
        /// CRC32 stored in the trailer.
        expected_crc: u32,
        /// CRC32 of the inflated data.
        actual_crc: u32,
    },
    /// The deflate stream itself stopped before its final block.
    StreamTruncated,
}

impl TrailerStatus {
    /// Returns `true` if the trailer was present and correct.
    pub fn is_verified(&self) -> bool {
        matches!(self, TrailerStatus::Verified)
    }
}

/// Result of a successful decompression.
#[derive(Debug, Clone)]
pub struct Decompressed {
    /// The inflated bytes.
    pub data: Vec<u8>,
    /// What was found after the deflate stream.
    pub trailer: TrailerStatus,
    /// The parsed gzip member header.
    pub header: GzipHeader,
}

/// Inflates one gzip member.
///
/// Returns [`Error::Decompression`] when the stream cannot be decoded at all.
/// Trailer problems are only errors when
/// [`tolerate_missing_trailer`](DecompressOptions::tolerate_missing_trailer)
/// is off.
pub fn decompress(input: &[u8], options: &DecompressOptions) -> Result<Decompressed> {
    let header = parse_header(input)?;
    let body = &input[header.header_len..];

    let inflated = gzip::inflate_raw(body, options.max_output)?;
    let rest = &body[inflated.consumed..];

    let trailer = if !inflated.stream_ended {
        TrailerStatus::StreamTruncated
    } else if rest.len() < gzip::TRAILER_LEN {
        TrailerStatus::Missing
    } else {
        let expected_crc = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
        let expected_size = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]);
        let actual_crc = crc32fast::hash(&inflated.data);
        let actual_size = inflated.data.len() as u32;

        if expected_crc == actual_crc && expected_size == actual_size {
            if rest.len() > gzip::TRAILER_LEN {
                log::debug!(
                    "Ignoring {} bytes after the gzip trailer",
                    rest.len() - gzip::TRAILER_LEN
                );
            }
            TrailerStatus::Verified
        } else if options.tolerate_missing_trailer {
            TrailerStatus::Mismatch {
                expected_crc,
                actual_crc,
            }
        } else {
            return Err(Error::TrailerMismatch {
                expected_crc,
                actual_crc,
                expected_size,
                actual_size,
            });
        }
    };

    match trailer {
        TrailerStatus::Verified => {}
        TrailerStatus::StreamTruncated | TrailerStatus::Missing
            if !options.tolerate_missing_trailer =>
        {
            return Err(Error::Decompression {
                reason: match trailer {
                    TrailerStatus::StreamTruncated => "deflate stream ends prematurely".into(),
                    _ => "gzip trailer is missing".into(),
                },
            });
        }
        other => {
            log::debug!(
                "Tolerating gzip trailer problem ({:?}) after {} inflated bytes",
                other,
                inflated.data.len()
            );
        }
    }

    Ok(Decompressed {
        data: inflated.data,
        trailer,
        header,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_intact_stream_verifies_trailer() {
        let data = b"1SLD fake page payload".repeat(20);
        let out = decompress(&gzip(&data), &DecompressOptions::strict()).unwrap();
        assert_eq!(out.data, data);
        assert_eq!(out.trailer, TrailerStatus::Verified);
    }

    #[test]
    fn test_missing_trailer_tolerated() {
        let data = b"private/var/log/system.log".repeat(8);
        let mut compressed = gzip(&data);
        compressed.truncate(compressed.len() - 8);

        let out = decompress(&compressed, &DecompressOptions::tolerant()).unwrap();
        assert_eq!(out.data, data);
        assert_eq!(out.trailer, TrailerStatus::Missing);
    }

    #[test]
    fn test_missing_trailer_rejected_in_strict_mode() {
        let mut compressed = gzip(b"some data");
        compressed.truncate(compressed.len() - 3);
        let err = decompress(&compressed, &DecompressOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }));
    }

    #[test]
    fn test_bad_crc_tolerated_or_rejected() {
        let mut compressed = gzip(b"payload bytes");
        let len = compressed.len();
        compressed[len - 8] ^= 0xFF;

        let out = decompress(&compressed, &DecompressOptions::tolerant()).unwrap();
        assert_eq!(out.data, b"payload bytes");
        assert!(matches!(out.trailer, TrailerStatus::Mismatch { .. }));

        let err = decompress(&compressed, &DecompressOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::TrailerMismatch { .. }));
    }

    #[test]
    fn test_truncated_deflate_keeps_prefix() {
        // Incompressible-ish data so the deflate stream is long enough to cut.
        let data: Vec<u8> = (0..20_000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let compressed = gzip(&data);
        let cut = &compressed[..compressed.len() / 2];

        let out = decompress(cut, &DecompressOptions::tolerant()).unwrap();
        assert_eq!(out.trailer, TrailerStatus::StreamTruncated);
        assert!(!out.data.is_empty());
        assert!(out.data.len() < data.len());
        assert_eq!(&data[..out.data.len()], &out.data[..]);
    }

    #[test]
    fn test_bad_magic_is_error_even_when_tolerant() {
        let err = decompress(b"not a gzip file", &DecompressOptions::tolerant()).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }));
    }

    #[test]
    fn test_output_limit() {
        let data = vec![0u8; 64 * 1024];
        let options = DecompressOptions::tolerant().max_output(1024);
        let err = decompress(&gzip(&data), &options).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    }
}
