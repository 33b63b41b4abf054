//! Keyed metadata store
//!
//! Per-file auxiliary records kept in a flat CSV or JSON file and keyed by
//! (file path, file name). Every mutation reads the whole file, changes the
//! in-memory rows and atomically replaces the file (sibling temp file, then
//! rename), so a failed write never leaves a truncated store behind.
//!
//! Mutations on the same path are serialized by a process-wide per-path
//! lock; readers share that lock and always see a complete snapshot.

use crate::config::{MetadataConfig, StoreFormat};
use crate::error::{Error, Result, StoreError};
use crate::types::MetadataEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};
use tokio::sync::RwLock;

mod codec;

use codec::Rows;

/// Locks shared by every store opened on the same path
///
/// Entries only live as long as some store holds the lock; dead ones are
/// pruned whenever a store is opened.
static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn path_lock(path: &Path) -> Arc<RwLock<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| lock.strong_count() > 0);

    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }
    let lock = Arc::new(RwLock::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Flat-file store of [`MetadataEntry`] records
#[derive(Clone, Debug)]
pub struct MetadataStore {
    path: PathBuf,
    format: StoreFormat,
    lock: Arc<RwLock<()>>,
}

impl MetadataStore {
    /// Open a store backed by `path`
    ///
    /// Nothing is read until the first operation.
    pub fn new(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        let path = path.into();
        let lock = path_lock(&path);
        Self { path, format, lock }
    }

    /// Open the store described by the configuration
    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(config.path.clone(), config.effective_format())
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File format
    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Every entry in file order
    ///
    /// # Errors
    ///
    /// [`StoreError::Unreadable`] if the file is missing or malformed.
    pub async fn list_all(&self) -> Result<Vec<MetadataEntry>> {
        let _guard = self.lock.read().await;
        Ok(self.load().await?.entries())
    }

    /// Remove every entry keyed by (`file_path`, `file_name`)
    ///
    /// Returns the number of removed entries. Deleting a key that is not
    /// present succeeds and leaves the file untouched.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unreadable`] if the file is missing or malformed,
    /// [`StoreError::Unwritable`] if the rewrite failed (the previous content
    /// is then still in place).
    pub async fn delete_by_key(&self, file_path: &str, file_name: &str) -> Result<usize> {
        let _guard = self.lock.write().await;

        let mut rows = self.load().await?;
        let before = rows.len();
        rows.remove_key(file_path, file_name);
        let removed = before - rows.len();

        if removed == 0 {
            tracing::debug!(
                path = %self.path.display(),
                file_path,
                file_name,
                "No matching metadata entry"
            );
            return Ok(0);
        }

        self.persist(&rows).await?;
        tracing::info!(
            path = %self.path.display(),
            file_path,
            file_name,
            removed,
            "Deleted metadata entries"
        );
        Ok(removed)
    }

    /// Add an entry, creating the file if it does not exist yet
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] if the entry does not fit the CSV column layout,
    /// otherwise the same store errors as [`delete_by_key`](Self::delete_by_key).
    pub async fn append(&self, entry: MetadataEntry) -> Result<()> {
        let _guard = self.lock.write().await;

        let mut rows = match tokio::fs::try_exists(&self.path).await {
            Ok(false) => Rows::empty(self.format),
            _ => self.load().await?,
        };
        rows.push(entry).map_err(Error::BadRequest)?;
        self.persist(&rows).await
    }

    async fn load(&self) -> Result<Rows> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unreadable(e.to_string()))?;
        Rows::decode(self.format, &bytes).map_err(|reason| {
            tracing::warn!(path = %self.path.display(), %reason, "Malformed metadata store");
            self.unreadable(reason)
        })
    }

    async fn persist(&self, rows: &Rows) -> Result<()> {
        let bytes = rows.encode().map_err(|reason| self.unwritable(reason))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| self.unwritable("path has no file name".to_string()))?;
        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.unwritable(e.to_string()))?;
        }

        if let Err(e) = tokio::fs::write(&tmp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.unwritable(e.to_string()));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.unwritable(e.to_string()));
        }
        Ok(())
    }

    fn unreadable(&self, reason: String) -> Error {
        Error::Store(StoreError::Unreadable {
            path: self.path.clone(),
            reason,
        })
    }

    fn unwritable(&self, reason: String) -> Error {
        Error::Store(StoreError::Unwritable {
            path: self.path.clone(),
            reason,
        })
    }
}
