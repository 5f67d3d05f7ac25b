//! Whole-file JSON helpers.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Errors from the whole-file JSON helpers.
#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads the file at `path` and parses it as JSON.
///
/// Fails when the file cannot be opened, read, or parsed. The file handle is
/// scoped to this call and released on every exit path, parse failures
/// included. JSON file content is always treated as UTF-8.
pub fn load_json_file(path: impl AsRef<Path>) -> Result<serde_json::Value, JsonFileError> {
    let path = path.as_ref();
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "path does not seem to refer to a valid file");
        // but fall through and try anyway
    }

    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

/// Serializes `data` as JSON and writes it out to `writer`.
pub fn save_json_file<W: Write, T: Serialize + ?Sized>(
    mut writer: W,
    data: &T,
) -> Result<(), JsonFileError> {
    serde_json::to_writer(&mut writer, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use serde_json::json;

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let data = json!({ "completions": [], "completion_start_column": 4 });
        let file = File::create(&path).unwrap();
        save_json_file(file, &data).unwrap();

        let loaded = load_json_file(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, JsonFileError::Io(_)));
    }

    #[test]
    fn load_unparseable_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = load_json_file(&path).unwrap_err();
        assert!(matches!(err, JsonFileError::Json(_)));
    }
}
