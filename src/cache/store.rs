//! File store for raw cached payloads
//!
//! Provides a `FileCache` that stores opaque byte blobs in files under a cache
//! directory. Blobs are always replaced whole, never appended to.

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when touching the cache directory
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache location could not be opened or replaced for writing
    #[error("Cannot write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file exists but could not be read
    #[error("Cannot read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads and writes raw cache blobs on disk
///
/// Each key maps to one file in the cache directory. The store does not
/// interpret blob contents; deserialization is the caller's concern.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileCache {
    /// Creates a new FileCache rooted at the given directory
    ///
    /// The directory does not need to exist yet; it is created on first write.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Returns the path to the cache file for the given key
    ///
    /// Keys may contain `/` to place the blob in a subdirectory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    /// Returns true if a blob is stored for the key, regardless of its content
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Reads the full blob stored for the key
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` if the blob exists and is non-empty
    /// * `Ok(None)` if the blob is missing or empty
    /// * `Err(CacheError::Read)` if the file exists but reading fails
    pub fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Returns when the blob for the key was last written, if one exists
    pub fn last_modified(&self, key: &str) -> Option<DateTime<Utc>> {
        let metadata = fs::metadata(self.path_for(key)).ok()?;
        if !metadata.is_file() {
            return None;
        }
        metadata.modified().ok().map(DateTime::<Utc>::from)
    }

    /// Replaces the entire blob stored for the key
    ///
    /// The content is written to a temporary sibling file and renamed over the
    /// slot, so readers see either the old blob or the new one.
    ///
    /// # Returns
    /// * `Ok(())` on success; `last_modified` now reports the write time
    /// * `Err(CacheError::Write)` if the directory or file cannot be written
    pub fn write(&self, key: &str, content: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));
        let parent = path.parent().unwrap_or(self.cache_dir.as_path());

        let to_write_error = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(parent).map_err(to_write_error)?;
        fs::write(&tmp_path, content).map_err(to_write_error)?;
        if let Err(source) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(to_write_error(source));
        }
        Ok(())
    }
}
