//! Line-delimited JSON output
//!
//! Each record is serialized as one compact JSON object followed by `\n`.
//! The sink tracks how many bytes it has produced so a checkpoint can
//! record exactly how much of the file belongs to completed batches.

use crate::domain::errors::DredgeError;
use crate::domain::Result;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Destination for exported records
pub trait RecordSink: Send {
    /// Appends one record
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()>;

    /// Pushes buffered records to the underlying writer
    fn flush(&mut self) -> Result<()>;

    /// Total bytes of records written, including any resumed prefix
    fn bytes_written(&self) -> u64;
}

/// [`RecordSink`] writing newline-delimited JSON to any writer
pub struct JsonLinesSink<W: Write + Send> {
    writer: BufWriter<W>,
    bytes_written: u64,
    line: Vec<u8>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wraps a writer, starting at offset zero
    pub fn new(writer: W) -> Self {
        Self::with_offset(writer, 0)
    }

    /// Wraps a writer that already holds `bytes_written` bytes of output
    pub fn with_offset(writer: W, bytes_written: u64) -> Self {
        Self {
            writer: BufWriter::new(writer),
            bytes_written,
            line: Vec::with_capacity(1024),
        }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| DredgeError::Io(e.error().to_string()))
    }
}

impl JsonLinesSink<File> {
    /// Creates (or truncates) the output file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            DredgeError::Io(format!("Failed to create {}: {e}", path.display()))
        })?;
        Ok(Self::new(file))
    }

    /// Reopens an output file for appending after its first `bytes_written` bytes
    ///
    /// Anything past that offset belongs to a batch that never completed and
    /// is cut off.
    ///
    /// # Errors
    ///
    /// Returns [`DredgeError::State`] if the file is shorter than the
    /// checkpoint claims.
    pub fn resume(path: &Path, bytes_written: u64) -> Result<Self> {
        let mut file = OpenOptions::new().write(true).open(path).map_err(|e| {
            DredgeError::Io(format!("Failed to reopen {}: {e}", path.display()))
        })?;

        let len = file.metadata()?.len();
        if len < bytes_written {
            return Err(DredgeError::State(format!(
                "{} holds {len} bytes but the checkpoint records {bytes_written}",
                path.display()
            )));
        }

        file.set_len(bytes_written)?;
        file.seek(SeekFrom::End(0))?;
        Ok(Self::with_offset(file, bytes_written))
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &Map<String, Value>) -> Result<()> {
        self.line.clear();
        serde_json::to_writer(&mut self.line, record)?;
        self.line.push(b'\n');
        self.writer.write_all(&self.line)?;
        self.bytes_written += self.line.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_one_compact_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_record(&record(json!({"qty": 3, "sku": "A1"})))
            .unwrap();
        sink.write_record(&record(json!({"sku": "B2", "tags": ["x", "y"]})))
            .unwrap();

        let bytes = sink.bytes_written();
        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "{\"qty\":3,\"sku\":\"A1\"}\n{\"sku\":\"B2\",\"tags\":[\"x\",\"y\"]}\n"
        );
        assert_eq!(bytes, out.len() as u64);
    }

    #[test]
    fn test_unicode_is_preserved() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_record(&record(json!({"name": "café ☕"}))).unwrap();
        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(out, "{\"name\":\"café ☕\"}\n");
    }

    #[test]
    fn test_resume_truncates_incomplete_tail() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "{\"a\":1}\n{\"a\":2}\n{\"a\":").unwrap();

        let mut sink = JsonLinesSink::resume(&path, 16).unwrap();
        assert_eq!(sink.bytes_written(), 16);
        sink.write_record(&record(json!({"a": 3}))).unwrap();
        sink.flush().unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n");
    }

    #[test]
    fn test_resume_rejects_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "{\"a\":1}\n").unwrap();

        let result = JsonLinesSink::resume(&path, 100);
        assert!(matches!(result, Err(DredgeError::State(_))));
    }

    #[test]
    fn test_create_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.flush().unwrap();
        drop(sink);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
