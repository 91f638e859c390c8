//! Parsing of many independent archives.
//!
//! Each archive is parsed by its own [`ParseSession`](super::ParseSession);
//! workers share nothing but the sink. With the `parallel` feature the work
//! runs on a rayon pool sized by [`ParseOptions::threads`], otherwise
//! sequentially.

use std::path::PathBuf;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::emit::EventSink;
use crate::{Error, Result};

use super::{ArchiveInput, ParseOptions, ParseSummary, parse_archive};

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Archives that were parsed, fully or partially, in input order.
    pub parsed: Vec<ParseSummary>,
    /// Archives that were skipped, with the reason, in input order.
    pub failed: Vec<(String, Error)>,
}

impl BatchSummary {
    /// Total records emitted over all archives.
    pub fn records_emitted(&self) -> usize {
        self.parsed.iter().map(|s| s.records_emitted).sum()
    }

    /// Total records rejected by validation over all archives.
    pub fn corrupt_records(&self) -> usize {
        self.parsed.iter().map(|s| s.corrupt_records).sum()
    }

    /// Returns `true` if no archive was skipped.
    pub fn all_parsed(&self) -> bool {
        self.failed.is_empty()
    }

    fn collect(results: Vec<(String, Result<ParseSummary>)>) -> Self {
        let mut batch = Self::default();
        for (name, result) in results {
            match result {
                Ok(summary) => batch.parsed.push(summary),
                Err(e) => batch.failed.push((name, e)),
            }
        }
        batch
    }
}

fn run<T, S, F>(items: &[T], options: &ParseOptions, sink: &S, parse_one: F) -> Result<BatchSummary>
where
    T: Sync,
    S: EventSink + ?Sized,
    F: Fn(&T, &ParseOptions, &S) -> (String, Result<ParseSummary>) + Sync,
{
    #[cfg(feature = "parallel")]
    let results: Vec<(String, Result<ParseSummary>)> = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads.count())
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        pool.install(|| {
            items
                .par_iter()
                .map(|item| parse_one(item, options, sink))
                .collect()
        })
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(String, Result<ParseSummary>)> = items
        .iter()
        .map(|item| parse_one(item, options, sink))
        .collect();

    sink.flush()?;
    Ok(BatchSummary::collect(results))
}

/// Parses in-memory archives into one shared sink.
///
/// A failing archive never stops the batch; it is listed in
/// [`BatchSummary::failed`].
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be created or the sink
/// cannot be flushed.
pub fn parse_batch<S: EventSink + ?Sized>(
    inputs: &[ArchiveInput],
    options: &ParseOptions,
    sink: &S,
) -> Result<BatchSummary> {
    run(inputs, options, sink, |input, options, sink| {
        let name = input.source.display_name().to_string();
        (name, parse_archive(input, options, sink))
    })
}

/// Reads and parses archive files into one shared sink.
///
/// Each file is read by the worker that parses it; a file that cannot be
/// read is listed in [`BatchSummary::failed`] like any other skipped
/// archive.
pub fn parse_paths<S: EventSink + ?Sized>(
    paths: &[PathBuf],
    options: &ParseOptions,
    sink: &S,
) -> Result<BatchSummary> {
    run(paths, options, sink, |path, options, sink| {
        let name = path.display().to_string();
        let result = ArchiveInput::from_path(path)
            .inspect_err(|e| log::warn!("{name}: cannot read, {e}"))
            .and_then(|input| parse_archive(&input, options, sink));
        (name, result)
    })
}
