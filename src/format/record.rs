//! Record decoding within one DLS page.

use super::{DlsVersion, EventMask, PAGE_HEADER_SIZE};

/// One decoded filesystem-change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Event id (fseventsd "working descriptor"). Never 0 in valid data.
    pub event_id: u64,
    /// Decoded path; CR, LF and TAB are dropped, may be empty.
    pub path: String,
    /// The flag mask.
    pub mask: EventMask,
    /// File system node id, DLS2 pages only.
    pub node_id: Option<i64>,
    /// Format version of the page holding this record.
    pub version: DlsVersion,
    /// Absolute archive offset of the first path byte.
    pub offset: u64,
    /// Absolute archive offset just past the record trailer.
    pub end_offset: u64,
}

impl Record {
    /// Returns the last path component.
    pub fn file_name(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[pos + 1..],
            None => &self.path,
        }
    }

    /// Returns the event id as big-endian hex, the byte-reversed form of the
    /// little-endian bytes on disk.
    pub fn event_id_hex(&self) -> String {
        format!("{:016x}", self.event_id)
    }
}

/// Decodes the records of one page, in order.
///
/// Iteration ends at the end of the page or at a truncated record; see
/// [`truncated_at`](RecordDecoder::truncated_at). Malformed trailing bytes
/// never cause a panic or an error.
#[derive(Debug, Clone)]
pub struct RecordDecoder<'a> {
    page: &'a [u8],
    version: DlsVersion,
    origin: u64,
    pos: usize,
    truncated_at: Option<u64>,
    stripped: usize,
}

impl<'a> RecordDecoder<'a> {
    /// Creates a decoder over the bytes of one page (header included).
    ///
    /// `origin` is the absolute archive offset of the page start.
    pub fn new(page: &'a [u8], version: DlsVersion, origin: u64) -> Self {
        Self {
            page,
            version,
            origin,
            pos: PAGE_HEADER_SIZE.min(page.len()),
            truncated_at: None,
            stripped: 0,
        }
    }

    /// Absolute offset of the incomplete record that ended decoding, if any.
    pub fn truncated_at(&self) -> Option<u64> {
        self.truncated_at
    }

    /// Number of CR/LF/TAB bytes dropped from paths so far.
    pub fn stripped_bytes(&self) -> usize {
        self.stripped
    }

    fn decode_path(&mut self, raw: &[u8]) -> String {
        let mut kept = Vec::with_capacity(raw.len());
        for (i, &byte) in raw.iter().enumerate() {
            match byte {
                b'\r' | b'\n' => {
                    log::debug!(
                        "Non-printable char {byte:#04x} in record path at offset {:#x} removed",
                        self.origin + (self.pos + i) as u64
                    );
                    self.stripped += 1;
                }
                b'\t' => self.stripped += 1,
                _ => kept.push(byte),
            }
        }
        String::from_utf8_lossy(&kept).into_owned()
    }
}

impl Iterator for RecordDecoder<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.truncated_at.is_some() || self.pos >= self.page.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.page[start..];
        let trailer_len = self.version.trailer_len();

        let nul = match rest.iter().position(|&b| b == 0) {
            Some(nul) if nul + trailer_len <= rest.len() => nul,
            _ => {
                let offset = self.origin + start as u64;
                log::debug!(
                    "Record at offset {offset:#x} runs past the end of its page ({} bytes left)",
                    rest.len()
                );
                self.truncated_at = Some(offset);
                return None;
            }
        };

        let path = self.decode_path(&rest[..nul]);
        let trailer = &rest[nul + 1..nul + trailer_len];

        let mut id_bytes = [0u8; 8];
        id_bytes.copy_from_slice(&trailer[..8]);
        let mut mask_bytes = [0u8; 4];
        mask_bytes.copy_from_slice(&trailer[8..12]);

        let node_id = match self.version {
            DlsVersion::V1 => None,
            DlsVersion::V2 => {
                let mut node_bytes = [0u8; 8];
                node_bytes.copy_from_slice(&trailer[12..20]);
                Some(i64::from_le_bytes(node_bytes))
            }
        };

        self.pos = start + nul + trailer_len;

        Some(Record {
            event_id: u64::from_le_bytes(id_bytes),
            path,
            mask: EventMask::from_be_bytes(mask_bytes),
            node_id,
            version: self.version,
            offset: self.origin + start as u64,
            end_offset: self.origin + self.pos as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(signature: &[u8; 4], total_len: usize) -> Vec<u8> {
        let mut data = signature.to_vec();
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&(total_len as u32).to_le_bytes());
        data
    }

    fn v1_record(path: &[u8], id: u64, mask: u32) -> Vec<u8> {
        let mut data = path.to_vec();
        data.push(0);
        data.extend_from_slice(&id.to_le_bytes());
        data.extend_from_slice(&mask.to_be_bytes());
        data
    }

    fn v2_record(path: &[u8], id: u64, mask: u32, node: i64) -> Vec<u8> {
        let mut data = v1_record(path, id, mask);
        data.extend_from_slice(&node.to_le_bytes());
        data
    }

    #[test]
    fn test_decode_v1_records() {
        let mut body = v1_record(b"Users/alice/notes.txt", 0x27d79, 0x0100_8000);
        body.extend(v1_record(b".fseventsd/sl-compat", 0x27d7a, 0x0000_0001));
        let mut page = header(b"1SLD", 12 + body.len());
        page.extend(&body);

        let records: Vec<Record> = RecordDecoder::new(&page, DlsVersion::V1, 100).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_id, 0x27d79);
        assert_eq!(records[0].path, "Users/alice/notes.txt");
        assert_eq!(records[0].file_name(), "notes.txt");
        assert_eq!(records[0].node_id, None);
        assert_eq!(records[0].offset, 112);
        assert_eq!(records[0].end_offset, 112 + 21 + 13);
        assert_eq!(records[1].offset, records[0].end_offset);
        assert_eq!(records[1].mask, EventMask(0x0000_0001));
        assert_eq!(records[0].event_id_hex(), "0000000000027d79");
    }

    #[test]
    fn test_decode_v2_node_id() {
        let body = v2_record(b"private/tmp/x", 42, 0x0100_8000, -7);
        let mut page = header(b"2SLD", 12 + body.len());
        page.extend(&body);

        let mut decoder = RecordDecoder::new(&page, DlsVersion::V2, 0);
        let record = decoder.next().unwrap();
        assert_eq!(record.node_id, Some(-7));
        assert_eq!(record.end_offset, page.len() as u64);
        assert!(decoder.next().is_none());
        assert_eq!(decoder.truncated_at(), None);
    }

    #[test]
    fn test_crlf_and_tab_dropped() {
        let body = v1_record(b"Users/a\r\nb\tc", 9, 0x0000_8000);
        let mut page = header(b"1SLD", 12 + body.len());
        page.extend(&body);

        let mut decoder = RecordDecoder::new(&page, DlsVersion::V1, 0);
        let record = decoder.next().unwrap();
        assert_eq!(record.path, "Users/abc");
        assert_eq!(decoder.stripped_bytes(), 3);
    }

    #[test]
    fn test_truncated_tail_keeps_prior_records() {
        let mut body = v1_record(b"first", 1, 0x0000_8000);
        let second = v1_record(b"second", 2, 0x0000_8000);
        body.extend_from_slice(&second[..second.len() - 5]);
        let mut page = header(b"1SLD", 12 + body.len());
        page.extend(&body);

        let mut decoder = RecordDecoder::new(&page, DlsVersion::V1, 0);
        let records: Vec<Record> = decoder.by_ref().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "first");
        assert_eq!(decoder.truncated_at(), Some(12 + 6 + 12));
    }

    #[test]
    fn test_path_without_terminator_is_truncation() {
        let mut page = header(b"2SLD", 20);
        page.extend_from_slice(b"dangling");
        let mut decoder = RecordDecoder::new(&page, DlsVersion::V2, 0);
        assert!(decoder.next().is_none());
        assert_eq!(decoder.truncated_at(), Some(12));
    }

    #[test]
    fn test_empty_path_and_invalid_utf8() {
        let mut body = v1_record(b"", 5, 0);
        body.extend(v1_record(&[b'a', 0xFF, b'b'], 6, 0));
        let mut page = header(b"1SLD", 12 + body.len());
        page.extend(&body);

        let records: Vec<Record> = RecordDecoder::new(&page, DlsVersion::V1, 0).collect();
        assert_eq!(records[0].path, "");
        assert_eq!(records[0].file_name(), "");
        assert_eq!(records[1].path, "a\u{FFFD}b");
    }

    #[test]
    fn test_header_only_page() {
        let page = header(b"1SLD", 12);
        assert_eq!(RecordDecoder::new(&page, DlsVersion::V1, 0).count(), 0);
        let short = b"1SLD".to_vec();
        assert_eq!(RecordDecoder::new(&short, DlsVersion::V1, 0).count(), 0);
    }
}
