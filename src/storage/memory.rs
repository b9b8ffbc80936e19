// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory credential store and file registry.
//!
//! Used for tests and for running the server without a database file.
//! Mirrors the redb backend's semantics (unique emails, no dangling parents).

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{paginate, CredentialStore, FileRegistry, StoreError, StoreResult};
use crate::models::{FileMetadata, User, UserId};

#[derive(Default)]
struct Documents {
    users: HashMap<UserId, User>,
    users_by_email: HashMap<String, UserId>,
    files: HashMap<String, FileMetadata>,
}

/// Document store held entirely in process memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<Documents>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Documents>> {
        self.docs
            .read()
            .map_err(|_| StoreError::Unavailable("document lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Documents>> {
        self.docs
            .write()
            .map_err(|_| StoreError::Unavailable("document lock poisoned".into()))
    }
}

#[async_trait]
impl CredentialStore for MemoryDocumentStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut docs = self.write()?;
        if docs.users_by_email.contains_key(&user.email) {
            return Err(StoreError::AlreadyExists(format!("User {}", user.email)));
        }
        docs.users_by_email
            .insert(user.email.clone(), user.id.clone());
        docs.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let docs = self.read()?;
        Ok(docs
            .users_by_email
            .get(email)
            .and_then(|id| docs.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn is_alive(&self) -> bool {
        true
    }
}

#[async_trait]
impl FileRegistry for MemoryDocumentStore {
    async fn insert_file(&self, file: &FileMetadata) -> StoreResult<()> {
        let mut docs = self.write()?;
        if let Some(parent_id) = &file.parent_id {
            if !docs.files.contains_key(parent_id) {
                return Err(StoreError::NotFound(format!("Parent {parent_id}")));
            }
        }
        if docs.files.contains_key(&file.id) {
            return Err(StoreError::AlreadyExists(format!("File {}", file.id)));
        }
        docs.files.insert(file.id.clone(), file.clone());
        Ok(())
    }

    async fn find_file_by_id(&self, id: &str) -> StoreResult<Option<FileMetadata>> {
        Ok(self.read()?.files.get(id).cloned())
    }

    async fn list_files(
        &self,
        owner_id: &UserId,
        parent_id: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> StoreResult<Vec<FileMetadata>> {
        let matching = self
            .read()?
            .files
            .values()
            .filter(|f| &f.owner_id == owner_id && f.parent_id.as_deref() == parent_id)
            .cloned()
            .collect();
        Ok(paginate(matching, page, page_size))
    }

    async fn update_visibility(&self, id: &str, is_public: bool) -> StoreResult<FileMetadata> {
        let mut docs = self.write()?;
        let file = docs
            .files
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("File {id}")))?;
        file.is_public = is_public;
        Ok(file.clone())
    }

    async fn count_files(&self) -> StoreResult<u64> {
        Ok(self.read()?.files.len() as u64)
    }

    async fn is_alive(&self) -> bool {
        true
    }
}
