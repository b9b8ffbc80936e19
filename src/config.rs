// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `DB_PATH` | redb document database file | `./data/files_manager.redb` |
//! | `SESSION_BACKEND` | `redis` or `memory` | `redis` |
//! | `REDIS_URL` | Redis connection URL | `redis://127.0.0.1:6379` |
//! | `SESSION_TTL_SECS` | Session lifetime in seconds, 1 to 31536000 | `86400` |
//! | `FOLDER_PATH` | Directory for file contents | `/tmp/files_manager` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::storage::MAX_SESSION_TTL;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DB_PATH_ENV: &str = "DB_PATH";
pub const SESSION_BACKEND_ENV: &str = "SESSION_BACKEND";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
/// Environment variable name for the file content directory.
///
/// Every non-folder upload is written here under a random name.
pub const FOLDER_PATH_ENV: &str = "FOLDER_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DB_PATH: &str = "./data/files_manager.redb";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_FOLDER_PATH: &str = "/tmp/files_manager";

/// Where sessions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` alone, so logging can start before the rest of
    /// the configuration is parsed.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_backend: SessionBackend,
    pub redis_url: String,
    pub session_ttl: Duration,
    pub folder_path: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let session_backend = match lookup(SESSION_BACKEND_ENV).as_deref() {
            None | Some("redis") => SessionBackend::Redis,
            Some("memory") => SessionBackend::Memory,
            Some(other) => {
                tracing::warn!(value = other, "unknown {SESSION_BACKEND_ENV}, using redis");
                SessionBackend::Redis
            }
        };

        let log_format = LogFormat::from_lookup(&lookup);

        Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, PORT_ENV, DEFAULT_PORT),
            db_path: lookup(DB_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            session_backend,
            redis_url: lookup(REDIS_URL_ENV).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            session_ttl: session_ttl(&lookup),
            folder_path: lookup(FOLDER_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_FOLDER_PATH.to_string())
                .into(),
            log_format,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn session_ttl(lookup: &impl Fn(&str) -> Option<String>) -> Duration {
    let secs = parse_or(lookup, SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS);
    if secs == 0 || secs > MAX_SESSION_TTL.as_secs() {
        tracing::warn!(
            value = secs,
            default = DEFAULT_SESSION_TTL_SECS,
            "{SESSION_TTL_ENV} out of range, using default"
        );
        return Duration::from_secs(DEFAULT_SESSION_TTL_SECS);
    }
    Duration::from_secs(secs)
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, default = %default, "unparseable value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.session_backend, SessionBackend::Redis);
        assert_eq!(config.session_ttl, Duration::from_secs(86400));
        assert_eq!(config.folder_path, PathBuf::from("/tmp/files_manager"));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("SESSION_BACKEND", "memory"),
            ("SESSION_TTL_SECS", "60"),
            ("LOG_FORMAT", "json"),
            ("DB_PATH", "/var/lib/fm/db.redb"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_backend, SessionBackend::Memory);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/fm/db.redb"));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("SESSION_TTL_SECS", "-1")]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.session_ttl, Duration::from_secs(86400));
    }

    #[test]
    fn out_of_range_ttl_falls_back() {
        for raw in ["0", "31536001", "18446744073709551615"] {
            let config = config_from(&[("SESSION_TTL_SECS", raw)]);
            assert_eq!(config.session_ttl, Duration::from_secs(86400), "{raw}");
        }

        let config = config_from(&[("SESSION_TTL_SECS", "31536000")]);
        assert_eq!(config.session_ttl, MAX_SESSION_TTL);
    }
}
