// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store backends.
//!
//! - [`RedisSessionStore`]: `PSETEX` / `GET` / `DEL` against a shared Redis,
//!   so sessions survive restarts and are visible to every server instance.
//! - [`MemorySessionStore`]: expiring map for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::AsyncCommands;

use super::{clamp_session_ttl, SessionStore, StoreError, StoreResult};

// =============================================================================
// Redis
// =============================================================================

/// Redis-backed session store.
///
/// `ConnectionManager` reconnects on its own; each call works on a cheap
/// clone of the managed connection.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("connected to redis session store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        // PSETEX rejects a zero expiry; the clamp keeps it at least 1 ms.
        let millis = u64::try_from(clamp_session_ttl(ttl).as_millis()).unwrap_or(u64::MAX);
        conn.pset_ex::<_, _, ()>(key, value, millis).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let mut conn = self.conn.clone();
        match conn.req_packed_command(&redis::cmd("PING")).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "redis ping failed");
                false
            }
        }
    }
}

// =============================================================================
// In-memory
// =============================================================================

struct SessionEntry {
    value: String,
    expires_at: Instant,
}

/// In-process session store with per-key expiry.
///
/// Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, SessionEntry>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("session lock poisoned".into()))
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);
        Ok(before - entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.lock()?.insert(
            key.to_string(),
            SessionEntry {
                value: value.to_string(),
                expires_at: Instant::now() + clamp_session_ttl(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.lock()?;
        if let Some(entry) = entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Ok(Some(entry.value.clone()));
            }
            // Expired, drop it
            entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.entries.lock().is_ok()
    }
}
