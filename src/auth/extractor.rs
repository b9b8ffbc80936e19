// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, BasicCredentials, SessionToken};
use crate::models::UserId;
use crate::state::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-token";

/// The caller behind a live session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    /// The token the request presented; needed to close the session.
    pub token: SessionToken,
}

/// Extractor requiring a valid `X-Token` session.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_files(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<FileResponse>>, ApiError> {
///     // user.user_id is the session's owner
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if an earlier layer already resolved the session
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SessionToken::from_client)
            .ok_or(AuthError::Unauthorized)?;

        let user_id = state.auth.resolve_token(&token).await?;
        let user = AuthenticatedUser { user_id, token };
        parts.extensions.insert(user.clone());

        Ok(Auth(user))
    }
}

/// Optional session extractor.
///
/// A missing or refused token yields `None`; a session backend failure is
/// still an error, so an outage never downgrades a caller to anonymous.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(AuthError::Unauthorized) => Ok(OptionalAuth(None)),
            Err(e) => Err(e),
        }
    }
}

/// Extractor for the raw basic-auth payload of a login request.
///
/// Decoding and verification are left to the auth manager.
pub struct BasicAuth(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BasicAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(BasicCredentials::payload_from_header)
            .map(|payload| BasicAuth(payload.to_string()))
            .ok_or(AuthError::Unauthorized)
    }
}
