//! Exit codes for the CLI tool.

use fseventsd::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Some logs were skipped or only partially parsed
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Not an fseventsd log, or undecodable
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    IoError,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
        }
    }
}

/// Converts a parse error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::Decompression { .. } | Error::TrailerMismatch { .. } => ExitCode::BadArchive,
        Error::NoPagesFound { .. } => ExitCode::BadArchive,
        Error::RecordTruncated { .. }
        | Error::RecordInvalid { .. }
        | Error::UnscannedTail { .. } => ExitCode::Warning,
        Error::ResourceLimitExceeded(_) => ExitCode::FatalError,
        Error::Serialization(_) | Error::ThreadPool(_) => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
