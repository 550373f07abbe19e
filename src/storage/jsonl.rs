//! Append-only JSONL audit store
//!
//! Each audit collection is one line-delimited JSON file under a directory.
//! A batch is serialized completely before any byte is written, then
//! appended with a single write and flush.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::AuditStore;
use crate::audit::AuditRecord;
use crate::error::{AuditError, AuditResult};

/// File-backed audit store, one `<collection>.jsonl` file per collection
pub struct JsonlAuditStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a collection
    pub fn collection_path(&self, collection: &str) -> AuditResult<PathBuf> {
        if collection.is_empty()
            || collection.contains(['/', '\\'])
            || collection.starts_with('.')
        {
            return Err(AuditError::Storage(format!(
                "Invalid collection name: '{}'",
                collection
            )));
        }
        Ok(self.dir.join(format!("{}.jsonl", collection)))
    }

    /// Read all records of a collection, oldest first
    pub fn read_all(&self, collection: &str) -> AuditResult<Vec<AuditRecord>> {
        let path = self.collection_path(collection)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                AuditError::Json(format!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }
}

impl AuditStore for JsonlAuditStore {
    fn append_batch(&self, collection: &str, records: &[AuditRecord]) -> AuditResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let path = self.collection_path(collection)?;

        let mut buffer = String::new();
        for record in records {
            let json = serde_json::to_string(record).map_err(|e| {
                AuditError::Json(format!("Failed to serialize audit record: {}", e))
            })?;
            buffer.push_str(&json);
            buffer.push('\n');
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| AuditError::Storage(format!("Failed to create log directory: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AuditError::Storage(format!("Failed to open audit log: {}", e)))?;

        file.write_all(buffer.as_bytes())
            .map_err(|e| AuditError::Storage(format!("Failed to write audit records: {}", e)))?;

        file.flush()
            .map_err(|e| AuditError::Storage(format!("Failed to flush audit log: {}", e)))?;

        debug!(collection, count = records.len(), path = %path.display(), "appended audit batch");
        Ok(records.len())
    }
}
