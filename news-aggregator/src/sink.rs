use crate::types::{Record, RecordSink};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

const SEPARATOR: &str = "==================================================";

/// Human-readable block per record.
pub struct TextSink<W: Write + Send> {
    writer: W,
}

impl TextSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        writeln!(self.writer, "Website Name: {}", record.source_name())?;
        writeln!(self.writer, "News Title: {}", record.title())?;
        writeln!(self.writer, "Description: {}", record.description())?;
        writeln!(self.writer, "Time Posted: {}", record.published_at())?;
        writeln!(self.writer, "{}", SEPARATOR)?;
        self.writer.flush()
    }
}

impl<W: Write + Send> RecordSink for TextSink<W> {
    fn emit(&mut self, record: &Record) {
        if let Err(e) = self.write_record(record) {
            warn!(error = %e, "failed to write record");
        }
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &Record) {
        if let Err(e) = self.write_record(record) {
            warn!(error = %e, "failed to write record");
        }
    }
}

/// Collects records in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: &Record) {
        self.lock().push(record.clone());
    }
}
