// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{
    auth::{password::hash_password, Auth},
    error::{ApiError, JsonBody},
    models::{CreateUserRequest, User, UserId, UserResponse},
    state::AppState,
    storage::StoreError,
};

/// Register a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing email, missing password, or email already registered"),
    )
)]
pub async fn post_new(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = request
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing email"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing password"))?;

    let password_hash = hash_password(&password).map_err(|e| {
        tracing::error!(error = %e, "could not hash password");
        ApiError::internal()
    })?;

    let user = User {
        id: UserId::generate(),
        email,
        password_hash,
        created_at: Utc::now(),
    };

    match state.users.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::AlreadyExists(_)) => return Err(ApiError::bad_request("Already exist")),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("x_token" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_me(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth.resolve_user(&user.token).await?;
    Ok(Json(user.into()))
}
