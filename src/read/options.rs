//! Parse configuration.

use crate::codec::{DEFAULT_MAX_OUTPUT, DecompressOptions};

/// Thread configuration for batch parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threads {
    /// Automatically determine thread count.
    #[default]
    Auto,
    /// Use a specific number of threads.
    ///
    /// If you have a value that might be zero, use
    /// [`Threads::count_or_single`] instead.
    Count(std::num::NonZeroUsize),
    /// Single-threaded operation.
    Single,
}

impl Threads {
    /// Creates a `Threads::Count` variant from a `usize`.
    ///
    /// Returns `Threads::Single` if the count is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fseventsd::read::Threads;
    ///
    /// assert_eq!(Threads::count_or_single(0), Threads::Single);
    /// assert_eq!(Threads::count_or_single(4).count(), 4);
    /// ```
    pub fn count_or_single(n: usize) -> Self {
        match std::num::NonZeroUsize::new(n) {
            Some(count) => Self::Count(count),
            None => Self::Single,
        }
    }

    /// Returns the actual thread count.
    ///
    /// `Auto` resolves to the number of available CPUs, minimum 1.
    pub fn count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Count(n) => n.get(),
            Self::Single => 1,
        }
    }
}

/// Options for parsing archives.
///
/// # Example
///
/// ```rust
/// use fseventsd::read::{ParseOptions, Threads};
///
/// let options = ParseOptions::new()
///     .use_modification_date(false)
///     .tolerate_missing_trailer(true)
///     .threads(Threads::Single);
/// assert!(!options.use_modification_date);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Use the archive modification date as a timeline fallback.
    pub use_modification_date: bool,
    /// Accept archives whose gzip trailer is missing or wrong.
    pub tolerate_missing_trailer: bool,
    /// Maximum inflated size of one archive.
    pub max_decompressed_size: usize,
    /// Worker threads for [`parse_batch`](super::parse_batch).
    pub threads: Threads,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            use_modification_date: true,
            tolerate_missing_trailer: true,
            max_decompressed_size: DEFAULT_MAX_OUTPUT,
            threads: Threads::Auto,
        }
    }
}

impl ParseOptions {
    /// Creates parse options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the modification-date fallback policy.
    pub fn use_modification_date(mut self, enabled: bool) -> Self {
        self.use_modification_date = enabled;
        self
    }

    /// Sets whether trailer problems are tolerated.
    pub fn tolerate_missing_trailer(mut self, tolerate: bool) -> Self {
        self.tolerate_missing_trailer = tolerate;
        self
    }

    /// Sets the inflated size limit.
    pub fn max_decompressed_size(mut self, limit: usize) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    /// Sets the thread configuration.
    pub fn threads(mut self, threads: Threads) -> Self {
        self.threads = threads;
        self
    }

    /// Returns the options passed to the decompressor.
    pub fn decompress_options(&self) -> DecompressOptions {
        DecompressOptions::tolerant()
            .tolerate_missing_trailer(self.tolerate_missing_trailer)
            .max_output(self.max_decompressed_size)
    }
}
