//! # fseventsd
//!
//! A pure-Rust parser for macOS FSEvents disk logs, the gzip-compressed
//! `DLS1`/`DLS2` files fseventsd keeps in `/.fseventsd`.
//!
//! The parser inflates a log (tolerating the missing trailer typical of
//! carved data), walks its pages, decodes each record into an event id, a
//! path and a flag mask, and attaches an approximate date recovered from
//! dated log file names found in the same log.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fseventsd::emit::VecSink;
//! use fseventsd::read::{ArchiveInput, ParseOptions, parse_archive};
//!
//! fn main() -> fseventsd::Result<()> {
//!     let input = ArchiveInput::from_path("/.fseventsd/0000000000027d79")?;
//!     let sink = VecSink::new();
//!     let summary = parse_archive(&input, &ParseOptions::default(), &sink)?;
//!
//!     for event in sink.records() {
//!         println!("{} {} {}{}", event.approx_dates, event.fullpath, event.event_type, event.flags);
//!     }
//!     println!("{} records, {:?}", summary.records_emitted, summary.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | gzip inflate, trailer optional | [`codec`] |
//! | page scan, record decode, flag table | [`format`] |
//! | carved-data heuristics | [`recovery`] |
//! | event id to date correlation | [`timeline`] |
//! | output records and sinks | [`emit`] |
//! | per-archive session, batches | [`read`] |
//!
//! ## Carved Logs
//!
//! A log whose file name is not 16 hex digits is treated as carved. Its name
//! and modification time are ignored for dating, and decoding stops at the
//! first record with a flag combination fseventsd never writes. Records
//! decoded before the stop are still emitted.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Parse batches of archives on a Rayon pool |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. No error stops a batch: a failing
//! archive is recorded and the next one is parsed.
//!
//! ```rust
//! use fseventsd::{Error, read::BatchSummary};
//!
//! fn report(batch: &BatchSummary) {
//!     for (name, error) in &batch.failed {
//!         match error {
//!             Error::NoPagesFound { .. } => eprintln!("{name}: not an FSEvents log"),
//!             e => eprintln!("{name}: {e}"),
//!         }
//!     }
//! }
//! ```
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod emit;
pub mod error;
pub mod format;
pub mod read;
pub mod recovery;
pub mod timeline;
pub mod timestamp;

pub use emit::{EventRecord, EventSink};
pub use error::{Error, Result};
pub use format::{DlsVersion, EventMask, Record};
pub use read::{ArchiveInput, ParseOptions, ParseSummary, parse_archive};
pub use timeline::{ApproxDate, Timeline};
pub use timestamp::LogDate;
