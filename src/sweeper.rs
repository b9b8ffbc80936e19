// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Sweeper
//!
//! Background task for the in-memory session backend. Expired entries are
//! already invisible to readers; the sweeper reclaims the memory of tokens
//! that are never presented again.
//!
//! Redis expires keys on its own, so the sweeper only runs with
//! `SESSION_BACKEND=memory`.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, shared with the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::MemorySessionStore;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct SessionSweeper {
    store: Arc<MemorySessionStore>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<MemorySessionStore>) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    fn sweep_step(&self) {
        match self.store.purge_expired() {
            Ok(0) => {}
            Ok(removed) => debug!(removed, remaining = self.store.len(), "expired sessions purged"),
            Err(e) => warn!(error = %e, "session sweep failed"),
        }
    }
}
