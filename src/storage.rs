//! JSON snapshot files.
//!
//! Both the task collection and the credential configuration are stored as a
//! single JSON document that is rewritten in full on every change. Writes go
//! to a temporary file in the target's directory which is then renamed over
//! the previous snapshot, so readers never observe a half-written file.

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and parses the snapshot at `path`.
///
/// Returns `Ok(None)` when the file does not exist yet.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Serializes `value` as pretty JSON and atomically replaces `path` with it.
///
/// The temporary file is created with owner-only permissions on Unix.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let content = serde_json::to_vec_pretty(value)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&content)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let result: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("numbers.json");

        write_json(&path, &vec![3_u32, 1, 2]).unwrap();
        let numbers: Vec<u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(numbers, vec![3, 1, 2]);

        write_json(&path, &Vec::<u32>::new()).unwrap();
        let numbers: Vec<u32> = read_json(&path).unwrap().unwrap();
        assert!(numbers.is_empty());
    }

    #[test]
    fn test_malformed_content_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[{ not json").unwrap();

        match read_json::<Vec<u32>>(&path) {
            Err(StorageError::Json(_)) => {}
            other => panic!("expected a JSON error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        write_json(&path, &vec!["a", "b"]).unwrap();
        write_json(&path, &vec!["c"]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_over_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();

        assert!(write_json(&path, &vec![1_u32]).is_err());
    }
}
