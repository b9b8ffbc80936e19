// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthManager;
use crate::storage::{
    BlobStore, CredentialStore, FileRegistry, MemoryBlobStore, MemoryDocumentStore,
    MemorySessionStore, SessionStore,
};

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthManager,
    pub users: Arc<dyn CredentialStore>,
    pub files: Arc<dyn FileRegistry>,
    pub sessions: Arc<dyn SessionStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        files: Arc<dyn FileRegistry>,
        sessions: Arc<dyn SessionStore>,
        blobs: Arc<dyn BlobStore>,
        session_ttl: Duration,
    ) -> Self {
        let auth = AuthManager::new(users.clone(), sessions.clone()).with_ttl(session_ttl);
        Self {
            auth,
            users,
            files,
            sessions,
            blobs,
        }
    }
}

impl Default for AppState {
    /// Everything in memory; for tests and local experiments.
    fn default() -> Self {
        let docs = Arc::new(MemoryDocumentStore::new());
        Self::new(
            docs.clone(),
            docs,
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryBlobStore::new()),
            crate::auth::DEFAULT_SESSION_TTL,
        )
    }
}
