// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::storage::StoreError;

/// Authentication error type.
///
/// Every credential or token problem collapses into `Unauthorized` so the
/// response never tells a caller whether an email exists or why a token was
/// refused. Backend failures stay distinct and map to a 5xx.
#[derive(Debug)]
pub enum AuthError {
    /// Bad credentials, or a missing, unknown or expired token
    Unauthorized,
    /// Session or credential store could not be reached
    Store(StoreError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthorized => write!(f, "Unauthorized"),
            AuthError::Store(e) => write!(f, "Session backend error: {e}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Store(e) => Some(e),
            AuthError::Unauthorized => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::Store(e)
    }
}

/// Extractor rejections render exactly like handler errors.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = AuthError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));
    }

    #[tokio::test]
    async fn store_failure_returns_500_without_details() {
        let err = AuthError::from(StoreError::Unavailable("redis down at 10.0.0.5".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Internal server error"}));
    }
}
