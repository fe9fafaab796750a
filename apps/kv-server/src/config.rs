// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once at startup from an optional YAML file and then
//! overridden by environment variables. The resolved [`AppConfig`] is passed
//! to the components that need it; nothing reads the environment later.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `KV_CONFIG` | Path of the YAML configuration file | `config.yml` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `KV_DATA_FILE` | Data file path | `./db/database.json` |
//! | `KV_STORAGE_FORMAT` | `plain`, `json`, `yaml` or `encrypted` | `json` |
//! | `KV_ENCRYPTION_KEY` | 64 hex chars (AES-256), required for `encrypted` | - |
//! | `KV_AUTH_MODE` | `basic` or `token` | `basic` |
//! | `KV_JWT_SECRET` | Token signing secret, required for `token` | - |
//! | `KV_USERS_FILE` | User registry (YAML) | `db.yml` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; TLS is enabled when both are set | - |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::storage::{codec::ENCRYPTION_KEY_LEN, StorageFormat};

pub const CONFIG_PATH_ENV: &str = "KV_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_FILE_ENV: &str = "KV_DATA_FILE";
pub const STORAGE_FORMAT_ENV: &str = "KV_STORAGE_FORMAT";
pub const ENCRYPTION_KEY_ENV: &str = "KV_ENCRYPTION_KEY";
pub const AUTH_MODE_ENV: &str = "KV_AUTH_MODE";
pub const JWT_SECRET_ENV: &str = "KV_JWT_SECRET";
pub const USERS_FILE_ENV: &str = "KV_USERS_FILE";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("{0}")]
    Missing(&'static str),
}

/// Access gate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Basic,
    Token,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "credentials" => Ok(AuthMode::Basic),
            "token" | "jwt" => Ok(AuthMode::Token),
            other => Err(format!("unknown auth mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Resolved application configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub storage_format: StorageFormat,
    pub encryption_key: Option<String>,
    pub auth_mode: AuthMode,
    pub jwt_secret: Option<String>,
    pub users_file: PathBuf,
    pub tls: Option<TlsConfig>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_file: PathBuf::from("./db/database.json"),
            storage_format: StorageFormat::Json,
            encryption_key: None,
            auth_mode: AuthMode::Basic,
            jwt_secret: None,
            users_file: PathBuf::from("db.yml"),
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_file", &self.data_file)
            .field("storage_format", &self.storage_format)
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .field("auth_mode", &self.auth_mode)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("users_file", &self.users_file)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load from the config file (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let explicit = lookup(CONFIG_PATH_ENV);
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        let mut config = match Self::from_file(&path) {
            Ok(config) => config,
            // The default config file is optional; an explicit one is not.
            Err(ConfigError::Read { source, .. })
                if explicit.is_none() && source.kind() == io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overlay values from an environment-like lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup(HOST_ENV) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?;
        }
        if let Some(path) = lookup(DATA_FILE_ENV) {
            self.data_file = PathBuf::from(path);
        }
        if let Some(format) = lookup(STORAGE_FORMAT_ENV) {
            self.storage_format = format
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: STORAGE_FORMAT_ENV,
                    reason,
                })?;
        }
        if let Some(key) = lookup(ENCRYPTION_KEY_ENV) {
            self.encryption_key = Some(key);
        }
        if let Some(mode) = lookup(AUTH_MODE_ENV) {
            self.auth_mode = mode.parse().map_err(|reason| ConfigError::InvalidValue {
                name: AUTH_MODE_ENV,
                reason,
            })?;
        }
        if let Some(secret) = lookup(JWT_SECRET_ENV) {
            self.jwt_secret = Some(secret);
        }
        if let Some(path) = lookup(USERS_FILE_ENV) {
            self.users_file = PathBuf::from(path);
        }
        if let (Some(cert_path), Some(key_path)) = (lookup(TLS_CERT_ENV), lookup(TLS_KEY_ENV)) {
            self.tls = Some(TlsConfig {
                cert_path: PathBuf::from(cert_path),
                key_path: PathBuf::from(key_path),
            });
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.log_format = format.parse().map_err(|reason| ConfigError::InvalidValue {
                name: LOG_FORMAT_ENV,
                reason,
            })?;
        }
        Ok(())
    }

    /// Check cross-field requirements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_format == StorageFormat::Encrypted {
            let key = self.encryption_key.as_deref().ok_or(ConfigError::Missing(
                "KV_ENCRYPTION_KEY is required for the encrypted storage format",
            ))?;
            let key = key.trim();
            if key.len() != ENCRYPTION_KEY_LEN * 2 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidValue {
                    name: ENCRYPTION_KEY_ENV,
                    reason: format!("expected {} hex characters", ENCRYPTION_KEY_LEN * 2),
                });
            }
        }

        if self.auth_mode == AuthMode::Token
            && self.jwt_secret.as_deref().is_none_or(|s| s.is_empty())
        {
            return Err(ConfigError::Missing(
                "KV_JWT_SECRET is required for token auth mode",
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
