//! CLI command integration tests.
//!
//! These tests cover what the `parse` and `info` commands are built on.
//! They call the library directly rather than running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;

use fseventsd::emit::{CountingSink, JsonLinesSink};
use fseventsd::format::PageHeader;
use fseventsd::read::{ParseOptions, ParseSession, ParseStatus, parse_paths};
use fseventsd::{DlsVersion, Error, parse_archive};
use tempfile::TempDir;

mod common;

#[allow(dead_code)]
#[path = "../src/bin/cli/exit_codes.rs"]
mod exit_codes;

use common::*;
use exit_codes::{ExitCode, error_to_exit_code};

/// A log cut inside the record that follows event 2.
fn truncated_log() -> Vec<u8> {
    let partial = &record_bytes(DlsVersion::V2, b"Users/alice/cut", 3, FILE_CREATED)[..20];
    log(&[PageBuilder::v2()
        .record("Users/alice/a.txt", 1, FILE_CREATED)
        .record("Users/alice/b.txt", 2, FILE_MODIFIED)
        .raw(partial)])
}

/// Writes `logs` into a temporary directory under their names.
fn write_logs(logs: &[(&str, Vec<u8>)]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let paths = logs
        .iter()
        .map(|(name, inflated)| {
            let path = dir.path().join(name);
            std::fs::write(&path, gzip(inflated)).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

// =============================================================================
// Parse Command Tests
// =============================================================================

#[test]
fn test_parse_json_lines() {
    let sink = JsonLinesSink::new(Vec::new());
    let summary = parse_archive(
        &input("0000000000000006", &sample_log()),
        &ParseOptions::default(),
        &sink,
    )
    .unwrap();
    assert_eq!(summary.records_emitted, 6);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 6);

    let ids: Vec<u64> = lines.iter().map(|l| l["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(lines[0]["fullpath"], "Users/alice/report.txt");
    assert_eq!(lines[0]["filename"], "report.txt");
    assert_eq!(lines[0]["source"], "0000000000000006");
    assert!(lines[0]["node_id"].is_null());
    assert_eq!(lines[2]["node_id"], 3);
    assert!(lines.iter().all(|l| l["type"].is_string()));
    assert!(
        lines
            .iter()
            .all(|l| l.get("approx_dates_plus_minus_one_day").is_some())
    );
}

#[test]
fn test_parse_files_from_disk() {
    let (_dir, paths) = write_logs(&[
        ("0000000000000006", sample_log()),
        ("0000000000000002", log(&[PageBuilder::v1()
            .record("private/var/x", 1, FILE_CREATED)
            .record("private/var/y", 2, FILE_CREATED)])),
    ]);

    let sink = CountingSink::new();
    let batch = parse_paths(&paths, &ParseOptions::default(), &sink).unwrap();

    assert!(batch.all_parsed());
    assert_eq!(batch.parsed.len(), 2);
    assert_eq!(batch.records_emitted(), 8);
    assert_eq!(sink.count(), 8);
}

#[test]
fn test_parse_missing_file_is_skipped() {
    let (dir, mut paths) = write_logs(&[("0000000000000006", sample_log())]);
    paths.push(dir.path().join("0000000000000099"));

    let batch = parse_paths(&paths, &ParseOptions::default(), &CountingSink::new()).unwrap();

    assert_eq!(batch.parsed.len(), 1);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(error_to_exit_code(&batch.failed[0].1), ExitCode::IoError);
}

// =============================================================================
// Info Command Tests
// =============================================================================

#[test]
fn test_info_page_and_version_counts() {
    let sink = CountingSink::new();
    let session = ParseSession::open(
        &input("0000000000000006", &sample_log()),
        &ParseOptions::default(),
        &sink,
    )
    .unwrap();

    let versions: Vec<DlsVersion> = session.pages().iter().map(|p| p.version).collect();
    assert_eq!(versions, vec![DlsVersion::V1, DlsVersion::V2, DlsVersion::V2]);
    assert_eq!(
        versions.iter().filter(|v| **v == DlsVersion::V2).count(),
        2
    );
    assert!(session.scan_stop().is_none());
    assert!(!session.archive().carved);
    assert_eq!(session.archive().last_event_id, Some(6));

    for page in session.pages() {
        assert_eq!(u64::from(page.header.page_len), page.end - page.start);
        assert_eq!(
            PageHeader::parse(page.bytes(&session.archive().data)),
            Some(page.header)
        );
    }

    let summary = session.run().unwrap();
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.records_emitted, 6);
    assert_eq!(sink.count(), 6);
    assert_eq!(summary.status(), ParseStatus::Complete);
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_truncated_archive_is_a_warning() {
    let summary = parse_archive(
        &input("0000000000000003", &truncated_log()),
        &ParseOptions::default(),
        &CountingSink::new(),
    )
    .unwrap();

    assert_eq!(summary.records_emitted, 2);
    assert_eq!(summary.status(), ParseStatus::Partial);
    assert!(matches!(summary.issues[..], [Error::RecordTruncated { .. }]));
    assert!(
        summary
            .issues
            .iter()
            .all(|e| error_to_exit_code(e) == ExitCode::Warning)
    );
    assert_eq!(ExitCode::Warning.code(), exit_codes::WARNING);
}

#[test]
fn test_unscanned_tail_is_a_warning() {
    let mut data = sample_log();
    data.extend_from_slice(b"not a page");

    let summary = parse_archive(
        &input("carved", &data),
        &ParseOptions::default(),
        &CountingSink::new(),
    )
    .unwrap();
    assert_eq!(summary.status(), ParseStatus::Partial);
    assert_eq!(error_to_exit_code(&summary.issues[0]), ExitCode::Warning);
}

#[test]
fn test_not_a_log_is_a_bad_archive() {
    let result = parse_archive(
        &input("0000000000000001", b"plain text, no pages here"),
        &ParseOptions::default(),
        &CountingSink::new(),
    );
    let error = result.unwrap_err();
    assert!(matches!(error, Error::NoPagesFound { .. }));
    assert_eq!(error_to_exit_code(&error), ExitCode::BadArchive);
    assert_eq!(error_to_exit_code(&error).code(), exit_codes::BAD_ARCHIVE);
}
