//! Archive parsing API.
//!
//! This module ties the pipeline together: an [`ArchiveInput`] is inflated,
//! scanned for pages, given a timeline and decoded record by record into an
//! [`EventSink`](crate::emit::EventSink).
//!
//! # Example
//!
//! ```rust,ignore
//! use fseventsd::emit::JsonLinesSink;
//! use fseventsd::read::{ParseOptions, parse_paths};
//!
//! let sink = JsonLinesSink::new(std::io::stdout());
//! let paths = vec!["/.fseventsd/0000000000027d79".into()];
//! let batch = parse_paths(&paths, &ParseOptions::default(), &sink)?;
//! println!("{} records, {} archives skipped", batch.records_emitted(), batch.failed.len());
//! ```

mod archive;
mod batch;
mod options;
mod session;

pub use archive::{Archive, ArchiveInput, ArchiveSource, name_event_id};
pub use batch::{BatchSummary, parse_batch, parse_paths};
pub use options::{ParseOptions, Threads};
pub use session::{ParseSession, ParseStatus, ParseSummary, parse_archive};
