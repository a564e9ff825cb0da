//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt a collection on failure.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::error::UndoError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, UndoError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        UndoError::Persistence(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        UndoError::Persistence(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write JSON to a file atomically
///
/// The data goes to a uniquely named temp file beside `path`, which then
/// replaces `path` in one rename. Concurrent writers never share a temp file,
/// and the file is either completely written or not modified at all.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), UndoError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| {
        UndoError::Persistence(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| UndoError::Persistence(format!("Failed to create temp file: {}", e)))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| UndoError::Persistence(format!("Failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| UndoError::Persistence(format!("Failed to flush data: {}", e)))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| UndoError::Persistence(format!("Failed to sync data: {}", e)))?;

    // On failure the temp file is removed when the returned handle drops
    temp.persist(path).map_err(|e| {
        UndoError::Persistence(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;

    Ok(())
}
