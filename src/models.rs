// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Stored documents and the request/response shapes of the REST API. Stored
//! documents ([`User`], [`FileMetadata`]) are what the credential store and
//! file registry persist; API views ([`UserResponse`], [`FileResponse`])
//! are what callers see.
//!
//! ## Model Categories
//!
//! - **Users**: account identity and password hash
//! - **Files**: folder/file/image metadata forming a tree per owner
//! - **Sessions**: the token returned by `/connect`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque user identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        UserId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

// =============================================================================
// User Models
// =============================================================================

/// A registered account as held by the credential store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Argon2 PHC string. Never returned to callers.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Request body for `POST /users`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

// =============================================================================
// Session Models
// =============================================================================

/// Response for `GET /connect`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// =============================================================================
// File Models
// =============================================================================

/// Kind of a file node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Folder,
    File,
    Image,
}

impl FileType {
    /// Parse a type name as sent by clients.
    pub fn parse(s: &str) -> Option<FileType> {
        match s {
            "folder" => Some(FileType::Folder),
            "file" => Some(FileType::File),
            "image" => Some(FileType::Image),
            _ => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, FileType::Folder)
    }
}

/// File metadata as held by the file registry.
///
/// Nodes form one tree per owner; `parent_id == None` is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub id: String,
    pub owner_id: UserId,
    pub name: String,
    pub file_type: FileType,
    pub is_public: bool,
    pub parent_id: Option<String>,
    /// Blob store key holding the content. `None` for folders.
    #[serde(default)]
    pub local_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /files`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// One of `folder`, `file`, `image`.
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
    /// Parent folder id; `0`, `"0"` or absent means the root.
    #[serde(default, deserialize_with = "deserialize_parent_id")]
    #[schema(value_type = Option<String>)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// Base64-encoded content. Required unless `type` is `folder`.
    #[serde(default)]
    pub data: Option<String>,
}

/// Public view of a file node. Never exposes the blob location.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: String,
    pub user_id: UserId,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub is_public: bool,
    pub parent_id: Option<String>,
}

impl From<FileMetadata> for FileResponse {
    fn from(file: FileMetadata) -> Self {
        Self {
            id: file.id,
            user_id: file.owner_id,
            name: file.name,
            file_type: file.file_type,
            is_public: file.is_public,
            parent_id: file.parent_id,
        }
    }
}

/// Accepts a string id, or the root markers `0` / `"0"` / `null`.
fn deserialize_parent_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ParentRef {
        Text(String),
        Number(i64),
    }

    match Option::<ParentRef>::deserialize(deserializer)? {
        None | Some(ParentRef::Number(0)) => Ok(None),
        Some(ParentRef::Text(s)) if s.is_empty() || s == "0" => Ok(None),
        Some(ParentRef::Text(s)) => Ok(Some(s)),
        Some(ParentRef::Number(n)) => Ok(Some(n.to_string())),
    }
}
