// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: login, token resolution, logout.

use std::sync::Arc;
use std::time::Duration;

use super::{password::verify_password_or_decoy, AuthError, BasicCredentials, SessionToken};
use crate::models::{User, UserId};
use crate::storage::{CredentialStore, SessionStore};

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Verifies credentials and owns the token ↔ user-id mapping.
///
/// Holds only handles to its stores, so clones are cheap and can be used
/// from any number of concurrent requests.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl AuthManager {
    pub fn new(users: Arc<dyn CredentialStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            users,
            sessions,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Override the session lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Verify a basic-auth payload (`base64("email:password")`) and open a
    /// session.
    ///
    /// # Errors
    /// `Unauthorized` for undecodable payloads, unknown emails and wrong
    /// passwords alike; `Store` if a backend is unreachable.
    pub async fn authenticate_with_credentials(
        &self,
        encoded: &str,
    ) -> Result<SessionToken, AuthError> {
        let Some(credentials) = BasicCredentials::decode(encoded) else {
            tracing::debug!("login rejected: malformed basic credentials");
            return Err(AuthError::Unauthorized);
        };

        let user = self.users.find_user_by_email(&credentials.email).await?;
        let verified = verify_password_or_decoy(
            user.as_ref().map(|u| u.password_hash.as_str()),
            &credentials.password,
        );

        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                tracing::debug!(user_id = %user.id, "login rejected: wrong password");
                return Err(AuthError::Unauthorized);
            }
            None => {
                tracing::debug!(email = %credentials.email, "login rejected: unknown email");
                return Err(AuthError::Unauthorized);
            }
        };

        let token = SessionToken::generate();
        self.sessions
            .set_with_expiry(&token.session_key(), user.id.as_str(), self.ttl)
            .await?;

        tracing::info!(user_id = %user.id, token = token.fingerprint(), "session opened");
        Ok(token)
    }

    /// Resolve a token to its user id. Does not extend the session.
    pub async fn resolve_token(&self, token: &SessionToken) -> Result<UserId, AuthError> {
        match self.sessions.get(&token.session_key()).await? {
            Some(user_id) => Ok(UserId::from(user_id)),
            None => {
                tracing::debug!(token = token.fingerprint(), "token unknown or expired");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Resolve a token all the way to its user record.
    ///
    /// A live token whose user has since disappeared is `Unauthorized`.
    pub async fn resolve_user(&self, token: &SessionToken) -> Result<User, AuthError> {
        let user_id = self.resolve_token(token).await?;
        match self.users.find_user_by_id(&user_id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %user_id, "session refers to a missing user");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Drop a session. Idempotent.
    pub async fn invalidate(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.sessions.delete(&token.session_key()).await?;
        tracing::info!(token = token.fingerprint(), "session closed");
        Ok(())
    }
}
