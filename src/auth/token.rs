// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Opaque session tokens.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

/// Prefix of session keys in the session store.
pub const SESSION_KEY_PREFIX: &str = "auth_";

/// Random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// A session token as handed to clients.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a fresh token from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        SessionToken(Base64UrlUnpadded::encode_string(&bytes))
    }

    /// Wrap a token presented by a client.
    pub fn from_client(value: impl Into<String>) -> Self {
        SessionToken(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Session store key for this token.
    pub fn session_key(&self) -> String {
        format!("{SESSION_KEY_PREFIX}{}", self.0)
    }

    /// Short prefix for log lines.
    pub fn fingerprint(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(6)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken({}…)", self.fingerprint())
    }
}
