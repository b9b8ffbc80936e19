// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File content storage.
//!
//! Contents are opaque to the rest of the service: a blob goes in, a key
//! comes out, and the key is kept on the file's metadata.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{BlobStore, StoreError, StoreResult};

/// Blobs as files in a local directory, one UUID-named file per blob.
///
/// The key handed out is the absolute path of the written file.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Only keys under `root` are served.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let path = PathBuf::from(key);
        if path.starts_with(&self.root) && !key.contains("..") {
            Some(path)
        } else {
            None
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, data: &[u8]) -> StoreResult<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(uuid::Uuid::new_v4().to_string());
        tokio::fs::write(&path, data).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let Some(path) = self.resolve(key) else {
            tracing::warn!(key, "blob key outside the blob directory");
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let Some(path) = self.resolve(key) else {
            tracing::warn!(key, "blob key outside the blob directory");
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Blobs held in process memory.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| StoreError::Unavailable("blob lock poisoned".into()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: &[u8]) -> StoreResult<String> {
        let key = uuid::Uuid::new_v4().to_string();
        self.lock()?.insert(key.clone(), data.to_vec());
        Ok(key)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn local_put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("files");
        let store = LocalBlobStore::new(&root);

        let key = store.put(b"Hello Webstack!").await.unwrap();
        assert!(Path::new(&key).starts_with(&root));

        let data = store.get(&key).await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"Hello Webstack!"[..]));
    }

    #[tokio::test]
    async fn local_missing_blob_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let key = dir.path().join("does-not-exist");

        assert!(store.get(&key.to_string_lossy()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("files");
        let store = LocalBlobStore::new(&root);

        assert!(store.get("/etc/passwd").await.unwrap().is_none());
        let sneaky = format!("{}/../secret", root.display());
        assert!(store.get(&sneaky).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_delete_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("files"));

        let key = store.put(b"temporary").await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(!Path::new(&key).exists());
        assert!(store.get(&key).await.unwrap().is_none());

        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn memory_delete() {
        let store = MemoryBlobStore::new();
        let key = store.put(b"abc").await.unwrap();
        store.delete(&key).await.unwrap();
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn memory_put_and_get() {
        let store = MemoryBlobStore::new();
        let key = store.put(b"abc").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(b"abc".to_vec()));
        assert!(store.get("other").await.unwrap().is_none());
    }
}
