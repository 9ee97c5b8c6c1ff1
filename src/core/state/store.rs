//! Checkpoint persistence
//!
//! Checkpoints live in a JSON sidecar named `<output>.checkpoint.json`.
//! Saves write a temporary file and rename it over the sidecar so that a
//! crash never leaves a half-written checkpoint behind.

use super::checkpoint::Checkpoint;
use crate::domain::errors::DredgeError;
use crate::domain::Result;
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const SIDECAR_SUFFIX: &str = ".checkpoint.json";

/// Reads and writes the checkpoint sidecar of one output file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store for the sidecar of `output`
    pub fn for_output(output: &Path) -> Self {
        let mut name: OsString = output.as_os_str().to_owned();
        name.push(SIDECAR_SUFFIX);
        Self {
            path: PathBuf::from(name),
        }
    }

    /// Sidecar location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint, if one exists
    ///
    /// # Errors
    ///
    /// Returns [`DredgeError::State`] if the sidecar exists but cannot be
    /// read or parsed.
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DredgeError::State(format!(
                    "Failed to read checkpoint {}: {e}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            DredgeError::State(format!(
                "Corrupt checkpoint {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Atomically replaces the sidecar with `checkpoint`
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = serde_json::to_vec_pretty(checkpoint)?;

        let mut tmp_name: OsString = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };

        write().map_err(|e| {
            DredgeError::State(format!(
                "Failed to save checkpoint {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Deletes the sidecar; a missing sidecar is not an error
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DredgeError::State(format!(
                "Failed to remove checkpoint {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::CheckpointStatus;
    use crate::domain::{Cursor, IndexName};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        let store = CheckpointStore::for_output(Path::new("/data/inventory_data.jsonl"));
        assert_eq!(
            store.path(),
            Path::new("/data/inventory_data.jsonl.checkpoint.json")
        );
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::for_output(&dir.path().join("out.jsonl"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = CheckpointStore::for_output(&output);

        let mut checkpoint = Checkpoint::new(IndexName::new("inventory").unwrap(), &output, "_id");
        checkpoint.mark_started();
        checkpoint.record_batch(2, 64, Cursor::new(vec![json!("b")]));
        store.save(&checkpoint).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.run_id, checkpoint.run_id);
        assert_eq!(loaded.status, CheckpointStatus::InProgress);
        assert_eq!(loaded.bytes_written, 64);
        assert_eq!(loaded.cursor, Cursor::new(vec![json!("b")]));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = CheckpointStore::for_output(&dir.path().join("out.jsonl"));
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(DredgeError::State(_))));
    }

    #[test]
    fn test_empty_cursor_in_checkpoint_is_rejected() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = CheckpointStore::for_output(&output);

        let mut checkpoint = Checkpoint::new(IndexName::new("inventory").unwrap(), &output, "_id");
        checkpoint.mark_started();
        checkpoint.record_batch(1, 16, Cursor::new(vec![json!("a")]));
        let mut value = serde_json::to_value(&checkpoint).unwrap();
        value["cursor"] = json!([]);
        fs::write(store.path(), value.to_string()).unwrap();

        assert!(matches!(store.load(), Err(DredgeError::State(_))));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.jsonl");
        let store = CheckpointStore::for_output(&output);
        store
            .save(&Checkpoint::new(IndexName::new("inventory").unwrap(), &output, "_id"))
            .unwrap();

        store.remove().unwrap();
        assert!(!store.path().exists());
        store.remove().unwrap();
    }
}
