// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Basic-auth credential decoding.

use base64ct::{Base64, Encoding};

/// An `email:password` pair decoded from a basic-auth payload.
///
/// `Debug` hides the password.
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    /// Decode `base64("email:password")`.
    ///
    /// Splits on the first `:`, so passwords may contain colons. Returns
    /// `None` for invalid base64, non-UTF-8 payloads, a missing separator or
    /// an empty email.
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = Base64::decode_vec(encoded.trim()).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;
        let (email, password) = decoded.split_once(':')?;
        if email.is_empty() {
            return None;
        }
        Some(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    /// Strip the `Basic ` scheme from an `Authorization` header value.
    pub fn payload_from_header(header: &str) -> Option<&str> {
        let (scheme, payload) = header.trim().split_once(' ')?;
        scheme.eq_ignore_ascii_case("basic").then_some(payload.trim())
    }
}
