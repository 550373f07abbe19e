//! JSON document files on disk
//!
//! Settings and the documents handed to `diff` are single JSON files. Reads
//! report the offending path; settings writes go through a sibling temp file
//! and a rename so a crash never leaves a half-written config behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AuditError, AuditResult};

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> AuditError {
    AuditError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Read a JSON file, falling back to `T::default()` when it does not exist
pub fn read_json<T, P>(path: P) -> AuditResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.exists() {
        read_json_required(path)
    } else {
        Ok(T::default())
    }
}

/// Read a JSON file that must exist
pub fn read_json_required<T, P>(path: P) -> AuditResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(AuditError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let file = File::open(path).map_err(|e| storage_error("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace a JSON file in one rename
pub fn write_json_atomic<T, P>(path: P, data: &T) -> AuditResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    // same directory, or the rename is not atomic
    let staging = path.with_extension("json.tmp");

    let result = (|| {
        let mut writer = BufWriter::new(
            File::create(&staging).map_err(|e| storage_error("create", &staging, e))?,
        );
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| storage_error("serialize", path, e))?;
        writer
            .flush()
            .map_err(|e| storage_error("flush", &staging, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| storage_error("sync", &staging, e))?;
        fs::rename(&staging, path).map_err(|e| storage_error("replace", path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}
