//! Persistence collaborator for serialized logs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;

/// A log write failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable storage for serialized audit logs.
///
/// The recorder hands over one full serialized buffer per save; naming
/// and directory management are the store's concern.
pub trait LogStore: Send + Sync {
    /// Write one serialized log, returning where it landed.
    fn write(&self, bytes: &[u8]) -> Result<PathBuf, StoreError>;
}

/// Store writing each log as a time-named file under one directory.
///
/// The directory is created on first write if missing. File names are
/// the Unix epoch milliseconds at write time, collision-resistant for
/// the explicit, user-triggered save cadence this recorder has.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    dir: PathBuf,
}

/// File extension for saved capture sessions.
const LOG_EXTENSION: &str = "ipca";

impl FileLogStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory logs are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LogStore for FileLogStore {
    fn write(&self, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let name = format!("{}.{LOG_EXTENSION}", Utc::now().timestamp_millis());
        let path = self.dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(path)
    }
}

/// In-memory store for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    saved: Mutex<Vec<Vec<u8>>>,
}

impl MemoryLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers written so far, oldest first.
    pub fn saved(&self) -> Vec<Vec<u8>> {
        self.saved.lock().clone()
    }
}

impl LogStore for MemoryLogStore {
    fn write(&self, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let mut saved = self.saved.lock();
        saved.push(bytes.to_vec());
        Ok(PathBuf::from(format!("memory:{}", saved.len() - 1)))
    }
}
