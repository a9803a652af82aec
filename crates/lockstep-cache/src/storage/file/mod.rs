//! File-backed store (one `rkyv` file per fingerprint).
//!
//! Layout: `<root>/<key>.rkyv`. Writes go to a temporary file in the same
//! directory which is synced and renamed over the final path, so readers
//! never observe a partially written entry.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use tempfile::NamedTempFile;

use super::{CacheEntry, CacheStore, StoreError, StoreResult};

const RKYV_EXTENSION: &str = "rkyv";

#[derive(Debug, Clone)]
/// Stores [`CacheEntry`] records under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root` (created lazily on first write).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the root directory exists.
    pub fn ensure_root(&self) -> StoreResult<()> {
        ensure_dir(&self.root)
    }

    fn entry_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, RKYV_EXTENSION)))
    }

    async fn blocking<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> StoreResult<T> + Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || f(root))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let path = self.entry_path(key)?;
        let key = key.to_string();
        self.blocking(move |_| read_entry(&key, &path)).await
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> StoreResult<()> {
        let path = self.entry_path(key)?;
        let bytes =
            rkyv::to_bytes::<RkyvError>(entry).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.blocking(move |root| write_atomic(&root, &path, &bytes))
            .await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let path = self.entry_path(key)?;
        self.blocking(move |_| match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        self.blocking(|root| {
            if !root.exists() {
                return Ok(Vec::new());
            }
            let mut keys = Vec::new();
            for dir_entry in fs::read_dir(&root)? {
                let path = dir_entry?.path();
                if path.extension().is_some_and(|ext| ext == RKYV_EXTENSION)
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                {
                    keys.push(stem.to_string());
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }
}

fn ensure_dir(root: &Path) -> StoreResult<()> {
    if !root.exists() {
        fs::create_dir_all(root).map_err(|_| StoreError::Unavailable {
            path: root.to_path_buf(),
        })?;
    } else if !root.is_dir() {
        return Err(StoreError::Unavailable {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Keys become file names, so only `[0-9A-Za-z_-]` is allowed.
fn validate_key(key: &str) -> StoreResult<()> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

fn read_entry(key: &str, path: &Path) -> StoreResult<Option<CacheEntry>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut aligned = AlignedVec::<16>::with_capacity(raw.len());
    aligned.extend_from_slice(&raw);

    rkyv::from_bytes::<CacheEntry, RkyvError>(&aligned)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

fn write_atomic(root: &Path, path: &Path, bytes: &[u8]) -> StoreResult<()> {
    ensure_dir(root)?;
    let mut tmp = NamedTempFile::new_in(root)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error.to_string()))?;
    Ok(())
}
