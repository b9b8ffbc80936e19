// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized User
//! - `users_by_email`: email → user id (uniqueness index)
//! - `files`: file id → serialized FileMetadata
//!
//! ## Execution
//!
//! redb is a blocking API. Each trait method runs its transaction inline on
//! the calling task; transactions touch a handful of metadata documents and
//! finish in bounded time. `list_files` deserializes every row of `files`,
//! so its cost grows with the registry.

use std::path::Path;

use async_trait::async_trait;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};

use super::{paginate, CredentialStore, FileRegistry, StoreError, StoreResult};
use crate::models::{FileMetadata, User, UserId};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user id → serialized User (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: email → user id.
const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// Primary table: file id → serialized FileMetadata (JSON bytes).
const FILES: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

// =============================================================================
// DocumentDatabase
// =============================================================================

/// Embedded ACID document database.
pub struct DocumentDatabase {
    db: Database,
}

impl DocumentDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(FILES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "document database opened");
        Ok(Self { db })
    }

    fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CredentialStore for DocumentDatabase {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            if by_email.get(user.email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("User {}", user.email)));
            }
            by_email.insert(user.email.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user_id = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(USERS_BY_EMAIL)?;
            match table.get(email)? {
                Some(v) => v.value().to_string(),
                None => return Ok(None),
            }
        };
        self.get_user(&user_id)
    }

    async fn find_user_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        self.get_user(id.as_str())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        Ok(table.len()?)
    }

    async fn is_alive(&self) -> bool {
        self.db.begin_read().is_ok()
    }
}

#[async_trait]
impl FileRegistry for DocumentDatabase {
    async fn insert_file(&self, file: &FileMetadata) -> StoreResult<()> {
        let json = serde_json::to_vec(file)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FILES)?;
            if let Some(parent_id) = &file.parent_id {
                if table.get(parent_id.as_str())?.is_none() {
                    return Err(StoreError::NotFound(format!("Parent {parent_id}")));
                }
            }
            if table.get(file.id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("File {}", file.id)));
            }
            table.insert(file.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn find_file_by_id(&self, id: &str) -> StoreResult<Option<FileMetadata>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FILES)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    async fn list_files(
        &self,
        owner_id: &UserId,
        parent_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<FileMetadata>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FILES)?;

        // Full scan; the registry holds metadata only.
        let mut matching = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let file: FileMetadata = serde_json::from_slice(value.value())?;
            if &file.owner_id == owner_id && file.parent_id.as_deref() == parent_id {
                matching.push(file);
            }
        }

        Ok(paginate(matching, page, page_size))
    }

    async fn update_visibility(&self, id: &str, is_public: bool) -> StoreResult<FileMetadata> {
        let write_txn = self.db.begin_write()?;
        let file = {
            let mut table = write_txn.open_table(FILES)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| StoreError::NotFound(format!("File {id}")))?;
                existing.value().to_vec()
            };

            let mut file: FileMetadata = serde_json::from_slice(&existing_bytes)?;
            file.is_public = is_public;

            let json = serde_json::to_vec(&file)?;
            table.insert(id, json.as_slice())?;
            file
        };
        write_txn.commit()?;
        Ok(file)
    }

    async fn count_files(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FILES)?;
        Ok(table.len()?)
    }

    async fn is_alive(&self) -> bool {
        self.db.begin_read().is_ok()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileType;
    use chrono::Utc;

    fn temp_db() -> (DocumentDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = DocumentDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn sample_user(email: &str) -> User {
        User {
            id: UserId::generate(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    fn sample_file(id: &str, owner: &UserId, parent: Option<&str>) -> FileMetadata {
        FileMetadata {
            id: id.to_string(),
            owner_id: owner.clone(),
            name: format!("{id}.txt"),
            file_type: FileType::File,
            is_public: false,
            parent_id: parent.map(str::to_string),
            local_path: Some(format!("/tmp/{id}")),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_user() {
        let (db, _dir) = temp_db();
        let alice = sample_user("alice@example.com");
        db.insert_user(&alice).await.unwrap();

        let found = db.find_user_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found, alice);

        let by_id = db.find_user_by_id(&alice.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn email_uniqueness_enforced() {
        let (db, _dir) = temp_db();
        db.insert_user(&sample_user("alice@example.com")).await.unwrap();

        let err = db.insert_user(&sample_user("alice@example.com")).await;
        assert!(matches!(err, Err(StoreError::AlreadyExists(_))));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn files_roundtrip_and_visibility() {
        let (db, _dir) = temp_db();
        let owner = UserId::from("owner-1");
        let mut folder = sample_file("dir", &owner, None);
        folder.file_type = FileType::Folder;
        folder.local_path = None;
        db.insert_file(&folder).await.unwrap();
        db.insert_file(&sample_file("f1", &owner, Some("dir"))).await.unwrap();

        let loaded = db.find_file_by_id("f1").await.unwrap().unwrap();
        assert_eq!(loaded.parent_id.as_deref(), Some("dir"));
        assert!(!loaded.is_public);

        let published = db.update_visibility("f1", true).await.unwrap();
        assert!(published.is_public);
        assert!(db.find_file_by_id("f1").await.unwrap().unwrap().is_public);

        assert_eq!(db.count_files().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn dangling_parent_rejected() {
        let (db, _dir) = temp_db();
        let owner = UserId::from("owner-1");
        let err = db.insert_file(&sample_file("f1", &owner, Some("ghost"))).await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_files_paginates_per_owner() {
        let (db, _dir) = temp_db();
        let owner = UserId::from("owner-1");
        let other = UserId::from("owner-2");

        for i in 0..25 {
            db.insert_file(&sample_file(&format!("f{i:02}"), &owner, None))
                .await
                .unwrap();
        }
        db.insert_file(&sample_file("other", &other, None)).await.unwrap();

        let first = db.list_files(&owner, None, 0, 20).await.unwrap();
        assert_eq!(first.len(), 20);
        let second = db.list_files(&owner, None, 1, 20).await.unwrap();
        assert_eq!(second.len(), 5);
        assert!(first.iter().chain(&second).all(|f| f.owner_id == owner));
    }

    #[tokio::test]
    async fn update_visibility_missing_file() {
        let (db, _dir) = temp_db();
        let err = db.update_visibility("nope", true).await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }
}
