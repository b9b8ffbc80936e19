// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service status and counters.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Backend reachability.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StatusResponse {
    /// Session store reachable.
    pub redis: bool,
    /// Document database reachable.
    pub db: bool,
}

/// Document counts.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StatsResponse {
    pub users: u64,
    pub files: u64,
}

/// Report whether the session store and the database are reachable.
///
/// Always 200; the body carries the verdict.
#[utoipa::path(
    get,
    path = "/status",
    tag = "App",
    responses((status = 200, description = "Backend reachability", body = StatusResponse))
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let redis = state.sessions.is_alive().await;
    let db = state.users.is_alive().await && state.files.is_alive().await;
    Json(StatusResponse { redis, db })
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "App",
    responses(
        (status = 200, description = "Number of users and files", body = StatsResponse),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let users = state.users.count_users().await?;
    let files = state.files.count_files().await?;
    Ok(Json(StatsResponse { users, files }))
}
