// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token sessions for the Files Manager API.
//!
//! ## Auth Flow
//!
//! 1. Client calls `GET /connect` with `Authorization: Basic base64(email:password)`
//! 2. Server:
//!    - Looks the user up by email in the credential store
//!    - Verifies the password against the stored Argon2 hash
//!    - Mints a random token and stores `auth_<token> → user_id` with a 24h TTL
//! 3. Client sends `X-Token: <token>` on protected endpoints
//! 4. `GET /disconnect` deletes the session key
//!
//! ## Security
//!
//! - Tokens carry 256 bits from the OS CSPRNG
//! - Sessions have a fixed lifetime; resolving a token never extends it
//! - All credential and token failures surface as one `Unauthorized`
//! - Plaintext passwords are never logged or stored

pub mod credentials;
pub mod error;
pub mod extractor;
pub mod manager;
pub mod password;
pub mod token;

pub use credentials::BasicCredentials;
pub use error::AuthError;
pub use extractor::{Auth, AuthenticatedUser, BasicAuth, OptionalAuth, TOKEN_HEADER};
pub use manager::{AuthManager, DEFAULT_SESSION_TTL};
pub use token::SessionToken;
