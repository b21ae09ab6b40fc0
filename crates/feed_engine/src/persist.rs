use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use feed_core::SnapshotEntry;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cache directory missing or not writable: {0}")]
    CacheDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Keyed storage for the serialized ranking snapshot.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, key: &str, entries: &[SnapshotEntry]) -> Result<(), PersistError>;

    /// `Ok(None)` when nothing was stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<SnapshotEntry>>, PersistError>;
}

/// Ensure the cache directory exists; create if missing.
pub fn ensure_cache_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::CacheDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_cache_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// One JSON file per key inside a cache directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    writer: AtomicFileWriter,
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.clone()),
            dir,
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }
}

fn file_name(key: &str) -> String {
    format!("{key}.json")
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, key: &str, entries: &[SnapshotEntry]) -> Result<(), PersistError> {
        let content = serde_json::to_string(entries)?;
        self.writer.write(&file_name(key), &content)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<SnapshotEntry>>, PersistError> {
        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// In-memory store holding the serialized JSON text per key.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw JSON last saved under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, key: &str, entries: &[SnapshotEntry]) -> Result<(), PersistError> {
        let content = serde_json::to_string(entries)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), content);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<SnapshotEntry>>, PersistError> {
        self.raw(key)
            .map(|content| serde_json::from_str(&content))
            .transpose()
            .map_err(PersistError::from)
    }
}
