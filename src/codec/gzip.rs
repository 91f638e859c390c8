//! gzip member framing around a raw deflate inflater.
//!
//! The member header (RFC 1952) is parsed here; the deflate body is handed to
//! [`flate2::Decompress`] in raw mode. Driving the inflater directly lets the
//! caller tell "stream ended" apart from "input ran out", which the
//! `Read`-based decoders fold into a single EOF.

use flate2::{Decompress, FlushDecompress, Status};

use crate::{Error, Result};

/// gzip member magic.
const MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Compression method byte for deflate.
const CM_DEFLATE: u8 = 8;
/// Size of the fixed part of the member header.
const FIXED_HEADER_LEN: usize = 10;
/// CRC32 + ISIZE.
pub(crate) const TRAILER_LEN: usize = 8;

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

/// Growth step of the output buffer.
const CHUNK: usize = 32 * 1024;

/// A parsed gzip member header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GzipHeader {
    /// Total header length, including optional fields.
    pub header_len: usize,
    /// Modification time stored in the header (Unix seconds, 0 if unset).
    pub mtime: u32,
    /// Original file name, if stored.
    pub file_name: Option<String>,
}

/// Parses the gzip member header at the start of `input`.
pub fn parse_header(input: &[u8]) -> Result<GzipHeader> {
    if input.len() < FIXED_HEADER_LEN {
        return Err(header_error("input shorter than a gzip header"));
    }
    if input[..2] != MAGIC {
        return Err(header_error("bad gzip magic"));
    }
    if input[2] != CM_DEFLATE {
        return Err(header_error(format!(
            "unsupported compression method {}",
            input[2]
        )));
    }

    let flags = input[3];
    let mtime = u32::from_le_bytes([input[4], input[5], input[6], input[7]]);
    let mut pos = FIXED_HEADER_LEN;

    if flags & FEXTRA != 0 {
        let len_bytes = input
            .get(pos..pos + 2)
            .ok_or_else(|| header_error("truncated FEXTRA length"))?;
        let extra_len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        pos += 2 + extra_len;
        if pos > input.len() {
            return Err(header_error("truncated FEXTRA field"));
        }
    }

    let mut file_name = None;
    if flags & FNAME != 0 {
        let (name, next) = read_zero_terminated(input, pos, "FNAME")?;
        file_name = Some(String::from_utf8_lossy(name).into_owned());
        pos = next;
    }

    if flags & FCOMMENT != 0 {
        let (_, next) = read_zero_terminated(input, pos, "FCOMMENT")?;
        pos = next;
    }

    if flags & FHCRC != 0 {
        pos += 2;
        if pos > input.len() {
            return Err(header_error("truncated header CRC"));
        }
    }

    Ok(GzipHeader {
        header_len: pos,
        mtime,
        file_name,
    })
}

fn read_zero_terminated<'a>(
    input: &'a [u8],
    pos: usize,
    field: &str,
) -> Result<(&'a [u8], usize)> {
    let tail = input.get(pos..).unwrap_or_default();
    match tail.iter().position(|&b| b == 0) {
        Some(end) => Ok((&tail[..end], pos + end + 1)),
        None => Err(header_error(format!("unterminated {field} field"))),
    }
}

fn header_error(reason: impl Into<String>) -> Error {
    Error::Decompression {
        reason: reason.into(),
    }
}

/// Output of [`inflate_raw`].
pub(crate) struct Inflated {
    pub data: Vec<u8>,
    /// Number of body bytes consumed by the deflate stream.
    pub consumed: usize,
    /// Whether the final deflate block was reached.
    pub stream_ended: bool,
}

/// Inflates a raw deflate stream until its final block or until the input
/// stops yielding progress.
pub(crate) fn inflate_raw(body: &[u8], max_output: usize) -> Result<Inflated> {
    let mut inflater = Decompress::new(false);
    let mut data: Vec<u8> = Vec::with_capacity(body.len().saturating_mul(4).min(max_output));

    loop {
        if data.len() == data.capacity() {
            data.reserve(CHUNK);
        }

        let in_before = inflater.total_in() as usize;
        let out_before = data.len();

        let status = inflater
            .decompress_vec(&body[in_before..], &mut data, FlushDecompress::None)
            .map_err(|e| Error::Decompression {
                reason: format!("corrupt deflate stream: {e}"),
            })?;

        if data.len() > max_output {
            return Err(Error::ResourceLimitExceeded(format!(
                "inflated archive exceeds {max_output} bytes"
            )));
        }

        match status {
            Status::StreamEnd => {
                return Ok(Inflated {
                    data,
                    consumed: inflater.total_in() as usize,
                    stream_ended: true,
                });
            }
            Status::Ok | Status::BufError => {
                let stalled =
                    inflater.total_in() as usize == in_before && data.len() == out_before;
                if stalled && data.len() < data.capacity() {
                    return Ok(Inflated {
                        data,
                        consumed: inflater.total_in() as usize,
                        stream_ended: false,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_header() {
        let header = [0x1f, 0x8b, 0x08, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x03];
        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.header_len, 10);
        assert_eq!(parsed.mtime, 0x10);
        assert_eq!(parsed.file_name, None);
    }

    #[test]
    fn test_parse_header_with_name_and_extra() {
        let mut header = vec![0x1f, 0x8b, 0x08, FEXTRA | FNAME, 0, 0, 0, 0, 0, 0x03];
        header.extend_from_slice(&[0x02, 0x00, 0xAA, 0xBB]);
        header.extend_from_slice(b"0000000000027d79\0");
        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.header_len, header.len());
        assert_eq!(parsed.file_name.as_deref(), Some("0000000000027d79"));
    }

    #[test]
    fn test_unterminated_name_is_error() {
        let header = [0x1f, 0x8b, 0x08, FNAME, 0, 0, 0, 0, 0, 0x03, b'a', b'b'];
        assert!(parse_header(&header).is_err());
    }

    #[test]
    fn test_wrong_method_is_error() {
        let header = [0x1f, 0x8b, 0x07, 0x00, 0, 0, 0, 0, 0, 0x03];
        let err = parse_header(&header).unwrap_err();
        assert!(err.to_string().contains("unsupported compression method"));
    }

    #[test]
    fn test_inflate_stored_block() {
        // Final stored block holding "abc".
        let body = [0x01, 0x03, 0x00, 0xFC, 0xFF, b'a', b'b', b'c'];
        let out = inflate_raw(&body, 1024).unwrap();
        assert_eq!(out.data, b"abc");
        assert!(out.stream_ended);
        assert_eq!(out.consumed, body.len());
    }

    #[test]
    fn test_inflate_cut_stored_block() {
        let body = [0x01, 0x05, 0x00, 0xFA, 0xFF, b'a', b'b'];
        let out = inflate_raw(&body, 1024).unwrap();
        assert_eq!(out.data, b"ab");
        assert!(!out.stream_ended);
    }

    #[test]
    fn test_inflate_invalid_block_type() {
        // BFINAL=1, BTYPE=11 (reserved).
        let body = [0x07, 0x00, 0x00];
        assert!(matches!(
            inflate_raw(&body, 1024),
            Err(Error::Decompression { .. })
        ));
    }
}
