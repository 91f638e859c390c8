//! Output sinks.
//!
//! # Built-in Sinks
//!
//! - [`VecSink`] - Collects records in memory
//! - [`JsonLinesSink`] - Writes one JSON object per line to a writer
//! - [`CountingSink`] - Discards records, counting them (for benchmarking)
//!
//! A sink is shared by every worker of a batch, so [`EventSink::append`]
//! takes `&self` and must write a record as one unit.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::EventRecord;
use crate::Result;

/// Destination of emitted records.
pub trait EventSink: Sync {
    /// Appends one record.
    ///
    /// Called concurrently by batch workers; the fields of one record must
    /// never interleave with another's.
    fn append(&self, record: &EventRecord) -> Result<()>;

    /// Flushes buffered output.
    ///
    /// The default implementation does nothing.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn append(&self, record: &EventRecord) -> Result<()> {
        (**self).append(record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Sink mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// In-memory sink.
///
/// # Example
///
/// ```rust
/// use fseventsd::emit::{EventSink, VecSink};
///
/// let sink = VecSink::new();
/// assert!(sink.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct VecSink {
    records: Mutex<Vec<EventRecord>>,
}

impl VecSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records collected.
    pub fn len(&self) -> usize {
        lock_or_recover(&self.records).len()
    }

    /// Returns `true` if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the collected records, in append order.
    pub fn records(&self) -> Vec<EventRecord> {
        lock_or_recover(&self.records).clone()
    }

    /// Consumes the sink, returning the collected records.
    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for VecSink {
    fn append(&self, record: &EventRecord) -> Result<()> {
        lock_or_recover(&self.records).push(record.clone());
        Ok(())
    }
}

/// Writes each record as one line of JSON.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn append(&self, record: &EventRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        lock_or_recover(&self.writer).write_all(&line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        lock_or_recover(&self.writer).flush()?;
        Ok(())
    }
}

/// Counts records without keeping them.
#[derive(Debug, Default)]
pub struct CountingSink {
    count: AtomicUsize,
}

impl CountingSink {
    /// Creates a sink with a count of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records appended.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl EventSink for CountingSink {
    fn append(&self, _record: &EventRecord) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{DlsVersion, EventMask, Record};
    use crate::read::ArchiveSource;
    use crate::timeline::ApproxDate;

    fn sample(id: u64) -> EventRecord {
        let record = Record {
            event_id: id,
            path: format!("tmp/{id}"),
            mask: EventMask(EventMask::FILE_EVENT),
            node_id: None,
            version: DlsVersion::V1,
            offset: 12,
            end_offset: 30,
        };
        EventRecord::new(&record, ApproxDate::Unknown, &ArchiveSource::new("src"))
    }

    #[test]
    fn test_json_lines() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.append(&sample(1)).unwrap();
        sink.append(&sample(2)).unwrap();
        sink.flush().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["fullpath"], "tmp/1");
    }

    #[test]
    fn test_counting_sink_through_reference() {
        let sink = CountingSink::new();
        let by_ref = &sink;
        by_ref.append(&sample(1)).unwrap();
        by_ref.append(&sample(2)).unwrap();
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_vec_sink_concurrent_appends() {
        let sink = VecSink::new();
        std::thread::scope(|scope| {
            for t in 0..4u64 {
                let sink = &sink;
                scope.spawn(move || {
                    for i in 0..25 {
                        sink.append(&sample(t * 100 + i + 1)).unwrap();
                    }
                });
            }
        });
        let mut ids: Vec<u64> = sink.into_records().iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }
}
