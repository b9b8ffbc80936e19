// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{Auth, BasicAuth},
    error::ApiError,
    models::TokenResponse,
    state::AppState,
};

/// Open a session with basic credentials.
#[utoipa::path(
    get,
    path = "/connect",
    tag = "Auth",
    security(("basic" = [])),
    responses(
        (status = 200, description = "Session token", body = TokenResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn get_connect(
    State(state): State<AppState>,
    BasicAuth(encoded): BasicAuth,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth.authenticate_with_credentials(&encoded).await?;
    Ok(Json(TokenResponse {
        token: token.into_string(),
    }))
}

/// Close the session named by `X-Token`.
#[utoipa::path(
    get,
    path = "/disconnect",
    tag = "Auth",
    security(("x_token" = [])),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn get_disconnect(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.auth.invalidate(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
