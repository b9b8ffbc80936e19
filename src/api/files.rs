// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File endpoints.
//!
//! Reads go through [`can_read`](crate::access::can_read) and visibility
//! changes through [`can_modify_visibility`](crate::access::can_modify_visibility).
//! A refused request answers exactly like a missing file.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64ct::{Base64, Encoding};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    access::{AccessCheck, VisibilityChange},
    auth::{Auth, OptionalAuth},
    error::{ApiError, JsonBody},
    models::{CreateFileRequest, FileMetadata, FileResponse, FileType},
    state::AppState,
    storage::StoreError,
};

/// Files per page in `GET /files`.
pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Parent folder id; absent or `0` lists the root.
    pub parent_id: Option<String>,
    /// 0-based page index.
    pub page: Option<String>,
}

/// Create a folder, or upload a file or image.
#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    security(("x_token" = [])),
    request_body = CreateFileRequest,
    responses(
        (status = 201, description = "File created", body = FileResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn post_upload(
    Auth(user): Auth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateFileRequest>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let name = request
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing name"))?;
    let file_type = request
        .file_type
        .as_deref()
        .and_then(FileType::parse)
        .ok_or_else(|| ApiError::bad_request("Missing type"))?;

    let content = if file_type.is_folder() {
        None
    } else {
        let data = request
            .data
            .ok_or_else(|| ApiError::bad_request("Missing data"))?;
        let bytes = Base64::decode_vec(data.trim())
            .map_err(|_| ApiError::bad_request("Invalid data"))?;
        Some(bytes)
    };

    // Someone else's node answers like a missing one.
    if let Some(parent_id) = request.parent_id.as_deref() {
        let parent = state
            .files
            .find_file_by_id(parent_id)
            .await?
            .children_addable_by(&user.user_id)
            .map_err(|_| ApiError::bad_request("Parent not found"))?;
        if !parent.file_type.is_folder() {
            return Err(ApiError::bad_request("Parent is not a folder"));
        }
    }

    let local_path = match content {
        Some(bytes) => Some(state.blobs.put(&bytes).await?),
        None => None,
    };

    let file = FileMetadata {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: user.user_id,
        name,
        file_type,
        is_public: request.is_public.unwrap_or(false),
        parent_id: request.parent_id,
        local_path,
        created_at: Utc::now(),
    };

    if let Err(e) = state.files.insert_file(&file).await {
        if let Some(key) = file.local_path.as_deref() {
            if let Err(cleanup) = state.blobs.delete(key).await {
                tracing::warn!(error = %cleanup, key, "could not remove orphaned blob");
            }
        }
        return Err(match e {
            // Parent removed between the check and the insert.
            StoreError::NotFound(_) => ApiError::bad_request("Parent not found"),
            e => e.into(),
        });
    }

    tracing::info!(file_id = %file.id, owner = %file.owner_id, kind = ?file.file_type, "file created");
    Ok((StatusCode::CREATED, Json(file.into())))
}

/// Get one file's metadata.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "Files",
    security(("x_token" = [])),
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn get_show(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let file = state
        .files
        .find_file_by_id(&id)
        .await?
        .readable_by(Some(&user.user_id))?;
    Ok(Json(file.into()))
}

/// List the caller's files under a folder, one page at a time.
#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    security(("x_token" = [])),
    params(ListFilesQuery),
    responses(
        (status = 200, description = "One page of files", body = [FileResponse]),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn get_index(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let parent_id = query
        .parent_id
        .as_deref()
        .filter(|p| !p.is_empty() && *p != "0");
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let files = state
        .files
        .list_files(&user.user_id, parent_id, page, PAGE_SIZE)
        .await?;
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/files/{id}/publish",
    tag = "Files",
    security(("x_token" = [])),
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File is now public", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn put_publish(
    auth: Auth,
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    set_visibility(auth, state, id, VisibilityChange::Publish).await
}

#[utoipa::path(
    put,
    path = "/files/{id}/unpublish",
    tag = "Files",
    security(("x_token" = [])),
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "File is now private", body = FileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn put_unpublish(
    auth: Auth,
    state: State<AppState>,
    id: Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    set_visibility(auth, state, id, VisibilityChange::Unpublish).await
}

async fn set_visibility(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    change: VisibilityChange,
) -> Result<Json<FileResponse>, ApiError> {
    state
        .files
        .find_file_by_id(&id)
        .await?
        .visibility_mutable_by(&user.user_id)?;

    let updated = match state.files.update_visibility(&id, change.target()).await {
        Ok(file) => file,
        Err(StoreError::NotFound(_)) => return Err(ApiError::not_found("Not found")),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(file_id = %id, ?change, "visibility changed");
    Ok(Json(updated.into()))
}

/// Serve a file's content.
///
/// Public files need no token. A bad token is treated as no token.
#[utoipa::path(
    get,
    path = "/files/{id}/data",
    tag = "Files",
    params(("id" = String, Path, description = "File id")),
    responses(
        (status = 200, description = "Raw file content"),
        (status = 400, description = "A folder doesn't have content"),
        (status = 404, description = "Not found"),
    )
)]
pub async fn get_file(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let caller = user.as_ref().map(|u| &u.user_id);
    let file = state
        .files
        .find_file_by_id(&id)
        .await?
        .readable_by(caller)?;

    if file.file_type.is_folder() {
        return Err(ApiError::bad_request("A folder doesn't have content"));
    }

    let Some(key) = file.local_path.as_deref() else {
        return Err(ApiError::not_found("Not found"));
    };
    let Some(bytes) = state.blobs.get(key).await? else {
        tracing::warn!(file_id = %file.id, "content missing from blob store");
        return Err(ApiError::not_found("Not found"));
    };

    let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.essence_str().to_string())], bytes).into_response())
}
