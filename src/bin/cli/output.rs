//! Output formatting for CLI operations.

use std::io::Write;
use std::sync::Mutex;

use fseventsd::codec::TrailerStatus;
use fseventsd::emit::EventSink;
use fseventsd::format::Page;
use fseventsd::read::{BatchSummary, ParseStatus, ParseSummary};
use fseventsd::timeline::TimeRange;
use fseventsd::{ApproxDate, EventRecord};
use serde_json::json;

/// Facts about one log gathered by the `info` command
pub struct InfoReport {
    pub source: String,
    pub carved: bool,
    pub last_event_id: Option<u64>,
    pub trailer: TrailerStatus,
    pub pages: Vec<Page>,
    pub ranges: Vec<TimeRange>,
    pub summary: ParseSummary,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the outcome of a `parse` run
    fn format_batch(&self, batch: &BatchSummary) -> String;

    /// Formats the `info` report
    fn format_info(&self, info: &InfoReport) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_batch(&self, batch: &BatchSummary) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Parsed {} logs, {} records",
            batch.parsed.len(),
            batch.records_emitted()
        ));
        if !batch.failed.is_empty() {
            output.push_str(&format!(", {} skipped", batch.failed.len()));
        }
        output.push('\n');

        for summary in batch
            .parsed
            .iter()
            .filter(|s| s.status() == ParseStatus::Partial)
        {
            output.push_str(&format!(
                "  {}: partial, {} records, {} corrupt, {} truncated pages\n",
                summary.source,
                summary.records_emitted,
                summary.corrupt_records,
                summary.truncated_pages
            ));
        }
        for (name, error) in &batch.failed {
            output.push_str(&format!("  {}: {}\n", name, error));
        }
        output
    }

    fn format_info(&self, info: &InfoReport) -> String {
        let mut output = String::new();

        output.push_str("Log Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Source:         {}\n", info.source));
        output.push_str(&format!(
            "  Carved:         {}\n",
            if info.carved { "Yes" } else { "No" }
        ));
        if let Some(id) = info.last_event_id {
            output.push_str(&format!("  Last event id:  {:016x} ({})\n", id, id));
        }
        output.push_str(&format!("  Trailer:        {}\n", trailer_text(info.trailer)));
        output.push_str(&format!(
            "  Inflated size:  {} bytes\n",
            info.summary.decompressed_size
        ));
        output.push_str(&format!("  Pages:          {}\n", info.pages.len()));
        for page in &info.pages {
            output.push_str(&format!(
                "    {} {:#010x}..{:#010x}{}\n",
                page.version,
                page.start,
                page.end,
                if page.truncated { " (truncated)" } else { "" }
            ));
        }
        output.push_str(&format!("  Time ranges:    {}\n", info.ranges.len()));
        for range in &info.ranges {
            output.push_str(&format!(
                "    {:>20} .. {:<20} {}\n",
                range.from_id,
                range.to_id,
                ApproxDate::Range {
                    from: range.from_date,
                    to: range.to_date
                }
            ));
        }
        output.push_str(&format!(
            "  Records:        {} emitted, {} decoded, {} corrupt\n",
            info.summary.records_emitted, info.summary.records_decoded, info.summary.corrupt_records
        ));
        for issue in &info.summary.issues {
            output.push_str(&format!("  Issue:          {}\n", issue));
        }
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_batch(&self, batch: &BatchSummary) -> String {
        let obj = json!({
            "success": batch.all_parsed(),
            "logs_parsed": batch.parsed.len(),
            "records_emitted": batch.records_emitted(),
            "corrupt_records": batch.corrupt_records(),
            "partial": batch.parsed.iter()
                .filter(|s| s.status() == ParseStatus::Partial)
                .map(|s| {
                    let issues: Vec<String> = s.issues.iter().map(|e| e.to_string()).collect();
                    json!({"source": s.source, "issues": issues})
                })
                .collect::<Vec<_>>(),
            "failures": batch.failed.iter()
                .map(|(p, e)| json!({"path": p, "error": e.to_string()}))
                .collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_info(&self, info: &InfoReport) -> String {
        let obj = json!({
            "source": info.source,
            "carved": info.carved,
            "last_event_id": info.last_event_id,
            "trailer": trailer_text(info.trailer),
            "decompressed_size": info.summary.decompressed_size,
            "pages": info.pages.iter().map(|p| json!({
                "version": p.version.name(),
                "start": p.start,
                "end": p.end,
                "truncated": p.truncated,
            })).collect::<Vec<_>>(),
            "time_ranges": info.ranges.iter().map(|r| json!({
                "from_id": r.from_id,
                "to_id": r.to_id,
                "from_date": r.from_date.map(|d| d.to_string()),
                "to_date": r.to_date.map(|d| d.to_string()),
            })).collect::<Vec<_>>(),
            "records_decoded": info.summary.records_decoded,
            "records_emitted": info.summary.records_emitted,
            "corrupt_records": info.summary.corrupt_records,
            "issues": info.summary.issues.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn trailer_text(trailer: TrailerStatus) -> &'static str {
    match trailer {
        TrailerStatus::Verified => "verified",
        TrailerStatus::Missing => "missing",
        TrailerStatus::Mismatch { .. } => "mismatch",
        TrailerStatus::StreamTruncated => "stream truncated",
    }
}

/// Writes events as tab-separated lines
pub struct HumanSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> HumanSink<W> {
    pub fn new(mut writer: W) -> std::io::Result<Self> {
        writeln!(writer, "id\tdate\ttype\tflags\tpath")?;
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }
}

impl<W: Write + Send> EventSink for HumanSink<W> {
    fn append(&self, record: &EventRecord) -> fseventsd::Result<()> {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\n",
            record.id_hex, record.approx_dates, record.event_type, record.flags, record.fullpath
        );
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> fseventsd::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.flush()?;
        Ok(())
    }
}
