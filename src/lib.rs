// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Files Manager - User Accounts and File Objects over HTTP
//!
//! Users register with an email and password, exchange basic credentials
//! for a session token, and manage a tree of folders, files and images.
//! Files are private to their owner until published.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Sessions, credentials and request extractors
//! - `access` - Read and visibility rules for files
//! - `storage` - Document database, session store and blob store
//! - `sweeper` - Expired session cleanup for the in-memory backend

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod sweeper;
pub mod telemetry;
