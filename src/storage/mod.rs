// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Every store the service talks to sits behind a trait so that handlers
//! and the auth manager receive them as injected `Arc<dyn ...>` handles:
//!
//! | Trait | Production backend | Test/dev backend |
//! |-------|--------------------|------------------|
//! | [`CredentialStore`] | [`DocumentDatabase`] (redb) | [`MemoryDocumentStore`] |
//! | [`FileRegistry`] | [`DocumentDatabase`] (redb) | [`MemoryDocumentStore`] |
//! | [`SessionStore`] | [`RedisSessionStore`] | [`MemorySessionStore`] |
//! | [`BlobStore`] | [`LocalBlobStore`] | [`MemoryBlobStore`] |
//!
//! ## Storage Layout (redb)
//!
//! ```text
//! users           id    -> User (JSON)
//! users_by_email  email -> id
//! files           id    -> FileMetadata (JSON)
//! ```
//!
//! ## Notes
//!
//! - Connectivity and backend failures surface as [`StoreError`] and are
//!   never folded into authentication failures.
//! - The session key space may be shared with other users of the same
//!   Redis; keys are namespaced by the auth manager.

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{FileMetadata, User, UserId};

pub mod blobs;
pub mod database;
pub mod error;
pub mod memory;
pub mod sessions;

pub use blobs::{LocalBlobStore, MemoryBlobStore};
pub use database::DocumentDatabase;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryDocumentStore;
pub use sessions::{MemorySessionStore, RedisSessionStore};

/// Persistent user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    /// `StoreError::AlreadyExists` if the email is taken.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: &UserId) -> StoreResult<Option<User>>;

    async fn count_users(&self) -> StoreResult<u64>;

    /// Whether the backend is reachable.
    async fn is_alive(&self) -> bool;
}

/// Persistent file metadata records.
#[async_trait]
pub trait FileRegistry: Send + Sync {
    /// Insert a new file node.
    ///
    /// # Errors
    /// `StoreError::NotFound` if `parent_id` names a missing node,
    /// `StoreError::AlreadyExists` if the id is taken.
    async fn insert_file(&self, file: &FileMetadata) -> StoreResult<()>;

    async fn find_file_by_id(&self, id: &str) -> StoreResult<Option<FileMetadata>>;

    /// One page of an owner's files directly under `parent_id`, oldest first.
    async fn list_files(
        &self,
        owner_id: &UserId,
        parent_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<FileMetadata>>;

    /// Set the visibility flag and return the updated record.
    ///
    /// # Errors
    /// `StoreError::NotFound` if the file does not exist.
    async fn update_visibility(&self, id: &str, is_public: bool) -> StoreResult<FileMetadata>;

    async fn count_files(&self) -> StoreResult<u64>;

    async fn is_alive(&self) -> bool;
}

/// Ephemeral key/value storage with per-key expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Returns `None` for absent or expired keys.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    async fn is_alive(&self) -> bool;
}

/// Shortest lifetime a session store grants.
pub const MIN_SESSION_TTL: Duration = Duration::from_millis(1);

/// Longest lifetime a session store grants (one year).
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Bring a requested lifetime into the range every backend honours the same way.
pub(crate) fn clamp_session_ttl(ttl: Duration) -> Duration {
    ttl.clamp(MIN_SESSION_TTL, MAX_SESSION_TTL)
}

/// Opaque content storage addressed by a key it hands out.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` and return its key.
    async fn put(&self, data: &[u8]) -> StoreResult<String>;

    /// Returns `None` if no blob exists under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Remove the blob under `key`. Removing a missing blob is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Sort newest-last and cut one page. Shared by the registry backends.
pub(crate) fn paginate(
    mut files: Vec<FileMetadata>,
    page: usize,
    page_size: usize,
) -> Vec<FileMetadata> {
    files.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    files
        .into_iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .collect()
}
