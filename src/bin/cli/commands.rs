//! Command implementations for the CLI tool.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fseventsd::emit::{CountingSink, EventSink, JsonLinesSink};
use fseventsd::read::{ArchiveInput, ParseOptions, ParseSession, parse_paths};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{HumanSink, InfoReport, create_formatter};

/// Configuration for the parse command.
pub struct ParseConfig<'a> {
    pub files: &'a [PathBuf],
    pub output: Option<&'a Path>,
    pub options: &'a ParseOptions,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Parse command implementation
pub fn parse(config: &ParseConfig<'_>) -> ExitCode {
    let writer: Box<dyn Write + Send> = match config.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Error creating '{}': {}", path.display(), e);
                return ExitCode::IoError;
            }
        },
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    let sink: Box<dyn EventSink + Send> = match config.format {
        OutputFormat::Json => Box::new(JsonLinesSink::new(writer)),
        OutputFormat::Human => match HumanSink::new(writer) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                eprintln!("Error writing output: {}", e);
                return ExitCode::IoError;
            }
        },
    };

    let batch = match parse_paths(config.files, config.options, sink.as_ref()) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if !config.quiet {
        eprint!("{}", create_formatter(config.format).format_batch(&batch));
    }

    if batch.parsed.is_empty() {
        return batch
            .failed
            .first()
            .map(|(_, e)| error_to_exit_code(e))
            .unwrap_or(ExitCode::Success);
    }
    let partial = batch.parsed.iter().any(|s| !s.issues.is_empty());
    if batch.all_parsed() && !partial {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

/// Info command implementation
pub fn info(archive_path: &Path, options: &ParseOptions, format: OutputFormat) -> ExitCode {
    let input = match ArchiveInput::from_path(archive_path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading '{}': {}", archive_path.display(), e);
            return error_to_exit_code(&e);
        }
    };

    let sink = CountingSink::new();
    let session = match ParseSession::open(&input, options, &sink) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error opening log: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let source = session.archive().source.display_name().to_string();
    let carved = session.archive().carved;
    let last_event_id = session.archive().last_event_id;
    let trailer = session.trailer();
    let pages = session.pages().to_vec();
    let ranges = session.timeline().ranges().to_vec();

    let summary = match session.run() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let report = InfoReport {
        source,
        carved,
        last_event_id,
        trailer,
        pages,
        ranges,
        summary,
    };
    print!("{}", create_formatter(format).format_info(&report));

    ExitCode::Success
}
