//! Atomic TOML file operations.
//!
//! Provides a thin layer for safe concurrent access to the TOML files the
//! stores keep their records in, across tasks and across processes.

use escape_core::error::EscapeError;
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// File locking error.
    #[error("Lock error: {0}")]
    Lock(String),
    /// The update function refused the change.
    #[error(transparent)]
    Rejected(EscapeError),
}

impl From<AtomicTomlError> for EscapeError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io(e) => e.into(),
            AtomicTomlError::Parse(e) => e.into(),
            AtomicTomlError::Serialize(e) => e.into(),
            AtomicTomlError::Lock(message) => EscapeError::data_access(message),
            AtomicTomlError::Rejected(e) => e,
        }
    }
}

/// A handle to a TOML file updated with tmp-file + rename under a file lock.
///
/// Provides:
/// - **Atomicity**: a reader sees the old or the new file, never a mix
/// - **Isolation**: `update` holds an exclusive lock across read-modify-write
/// - **Durability**: explicit fsync before rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new atomic TOML file handle.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the TOML file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&content)?))
    }

    /// Saves data to the TOML file atomically.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Performs a locked read-modify-write.
    ///
    /// `f` receives the current contents (`None` when the file does not
    /// exist) and returns whether it changed anything. The file is only
    /// rewritten when it did and holds a value. An `Err` from `f` aborts the
    /// update and leaves the file untouched.
    ///
    /// # Returns
    ///
    /// The value produced by `f`.
    pub fn update<R, F>(&self, f: F) -> Result<R, AtomicTomlError>
    where
        F: FnOnce(&mut Option<T>) -> Result<(R, bool), EscapeError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?;
        let (output, changed) = f(&mut data).map_err(AtomicTomlError::Rejected)?;
        if let (true, Some(data)) = (changed, &data) {
            self.save(data)?;
        }

        Ok(output)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let invalid = |message: &str| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                message.to_string(),
            ))
        };
        let parent = self
            .path
            .parent()
            .ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive advisory file lock, released on drop.
pub(crate) struct FileLock {
    file: File,
}

impl FileLock {
    /// Locks `<file>.lock` next to the data file at `path`.
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        Self::at(&path.with_extension("lock"))
    }

    /// Locks the file at `lock_path`, creating it if needed. Blocks until
    /// no other handle, in this process or another, holds it.
    pub(crate) fn at(lock_path: &Path) -> Result<Self, AtomicTomlError> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        FileExt::lock_exclusive(&file)
            .map_err(|e| AtomicTomlError::Lock(format!("Failed to lock {:?}: {}", lock_path, e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The lock file stays in place so every locker shares one inode.
        let _ = FileExt::unlock(&self.file);
    }
}
