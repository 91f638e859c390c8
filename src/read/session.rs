//! Parsing of one archive.
//!
//! A [`ParseSession`] owns everything derived from one archive: the inflated
//! buffer, its pages, its timeline and the running [`ParseSummary`]. Opening
//! a session inflates and scans the archive; [`ParseSession::run`] decodes
//! the pages in order and streams each valid record to the sink.

use crate::codec::{self, TrailerStatus};
use crate::emit::{EventEmitter, EventSink};
use crate::format::page::{PageScanner, ScanStop};
use crate::format::{Page, RecordDecoder};
use crate::recovery::RecordValidator;
use crate::timeline::Timeline;
use crate::{Error, Result};

use super::{Archive, ArchiveInput, ParseOptions};

/// How far decoding of an archive got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// Every page was decoded to its end.
    Complete,
    /// Decoding stopped early; the records before the stop were emitted.
    Partial,
}

/// Statistics of one parsed archive.
#[derive(Debug)]
pub struct ParseSummary {
    /// Source name or path.
    pub source: String,
    /// The archive was classified as carved.
    pub carved: bool,
    /// Gzip trailer state.
    pub trailer: TrailerStatus,
    /// Inflated size in bytes.
    pub decompressed_size: usize,
    /// Pages found.
    pub pages: usize,
    /// Time ranges in the timeline.
    pub time_ranges: usize,
    /// Records decoded, including a rejected one.
    pub records_decoded: usize,
    /// Records sent to the sink.
    pub records_emitted: usize,
    /// Records rejected by validation.
    pub corrupt_records: usize,
    /// Pages that ended mid-record or ran past the buffer.
    pub truncated_pages: usize,
    /// CR/LF/TAB bytes dropped from paths.
    pub stripped_bytes: usize,
    /// Record-level problems, in the order they occurred.
    pub issues: Vec<Error>,
}

impl ParseSummary {
    /// Returns whether the archive was decoded to its end.
    pub fn status(&self) -> ParseStatus {
        if self.issues.is_empty() && self.truncated_pages == 0 {
            ParseStatus::Complete
        } else {
            ParseStatus::Partial
        }
    }
}

/// Parse state of one archive.
pub struct ParseSession<'s, S: EventSink + ?Sized> {
    archive: Archive,
    pages: Vec<Page>,
    scan_stop: Option<ScanStop>,
    timeline: Timeline,
    validator: RecordValidator,
    trailer: TrailerStatus,
    sink: &'s S,
}

impl<'s, S: EventSink + ?Sized> ParseSession<'s, S> {
    /// Inflates and scans an archive, and builds its timeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompression`] (or a trailer error in strict mode)
    /// if the archive cannot be inflated, and [`Error::NoPagesFound`] if the
    /// inflated buffer holds no DLS page.
    pub fn open(input: &ArchiveInput, options: &ParseOptions, sink: &'s S) -> Result<Self> {
        let inflated =
            codec::decompress(&input.data, &options.decompress_options()).inspect_err(|e| {
                log::warn!("{}: skipped, {e}", input.source.display_name());
            })?;
        let archive = Archive::new(input.source.clone(), inflated.data);

        let mut scanner = PageScanner::new(&archive.data);
        let pages: Vec<Page> = scanner.by_ref().collect();
        let scan_stop = scanner.stop_reason();
        if pages.is_empty() {
            log::warn!(
                "{}: no DLS page header found, not an FSEvents log",
                archive.source.display_name()
            );
            return Err(Error::NoPagesFound {
                source_name: archive.source.display_name().to_string(),
            });
        }

        let timeline = Timeline::correlate(
            &archive.data,
            archive.timeline_seed(options.use_modification_date),
            archive.fallback_date(options.use_modification_date),
        );

        Ok(Self {
            validator: RecordValidator::new(archive.carved),
            archive,
            pages,
            scan_stop,
            timeline,
            trailer: inflated.trailer,
            sink,
        })
    }

    /// Returns the archive being parsed.
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Returns the pages found.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Returns why page scanning stopped.
    pub fn scan_stop(&self) -> Option<ScanStop> {
        self.scan_stop
    }

    /// Returns the timeline of the archive.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Returns the gzip trailer state.
    pub fn trailer(&self) -> TrailerStatus {
        self.trailer
    }

    /// Decodes every page and emits the valid records.
    ///
    /// Truncated pages, rejected records and bytes the page scan could not
    /// reach are recorded in [`ParseSummary::issues`]; only sink failures
    /// are returned as errors.
    pub fn run(self) -> Result<ParseSummary> {
        let Self {
            archive,
            pages,
            scan_stop,
            timeline,
            validator,
            trailer,
            sink,
        } = self;

        let name = archive.source.display_name();
        let mut summary = ParseSummary {
            source: name.to_string(),
            carved: archive.carved,
            trailer,
            decompressed_size: archive.data.len(),
            pages: pages.len(),
            time_ranges: timeline.ranges().len(),
            records_decoded: 0,
            records_emitted: 0,
            corrupt_records: 0,
            truncated_pages: 0,
            stripped_bytes: 0,
            issues: Vec::new(),
        };
        let mut emitter = EventEmitter::new(&archive.source, sink);
        let mut halted = false;

        for page in &pages {
            let mut decoder =
                RecordDecoder::new(page.bytes(&archive.data), page.version, page.start);

            for record in decoder.by_ref() {
                summary.records_decoded += 1;
                if let Err(reason) =
                    validator.check(record.event_id, record.mask, record.version)
                {
                    log::warn!(
                        "{name}: first invalid record ({reason}) at offset {:#x}, the remainder of this buffer will not be parsed",
                        record.offset
                    );
                    summary.corrupt_records += 1;
                    summary.issues.push(Error::RecordInvalid {
                        offset: record.offset,
                        event_id: record.event_id,
                        reason,
                    });
                    halted = true;
                    break;
                }
                emitter.emit(&record, timeline.apply_date(record.event_id))?;
            }

            summary.stripped_bytes += decoder.stripped_bytes();
            if let Some(offset) = decoder.truncated_at() {
                summary.issues.push(Error::RecordTruncated { offset });
            }
            if page.truncated || decoder.truncated_at().is_some() {
                summary.truncated_pages += 1;
            }
            if halted {
                break;
            }
        }

        if let Some(ScanStop::BadSignature { offset } | ScanStop::MalformedLength { offset }) =
            scan_stop
        {
            summary.issues.push(Error::UnscannedTail {
                offset,
                unscanned: archive.data.len() as u64 - offset,
            });
        }

        summary.records_emitted = emitter.emitted();
        log::debug!(
            "{name}: {} pages, {} records emitted, {} issues",
            summary.pages,
            summary.records_emitted,
            summary.issues.len()
        );
        Ok(summary)
    }
}

/// Parses one archive, streaming its records to `sink`.
///
/// # Example
///
/// ```rust,ignore
/// use fseventsd::emit::VecSink;
/// use fseventsd::read::{ArchiveInput, ParseOptions, parse_archive};
///
/// let input = ArchiveInput::from_path("/.fseventsd/0000000000027d79")?;
/// let sink = VecSink::new();
/// let summary = parse_archive(&input, &ParseOptions::default(), &sink)?;
/// println!("{} records", summary.records_emitted);
/// ```
pub fn parse_archive<S: EventSink + ?Sized>(
    input: &ArchiveInput,
    options: &ParseOptions,
    sink: &S,
) -> Result<ParseSummary> {
    ParseSession::open(input, options, sink)?.run()
}
