// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static user registry.
//!
//! Loaded once at startup from a YAML file such as:
//!
//! ```yaml
//! users:
//!   - username: admin
//!     passwordHash: $2b$10$...
//! ```
//!
//! The `password` field name is accepted as well.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One registry entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    /// Salted bcrypt hash.
    #[serde(rename = "passwordHash", alias = "password")]
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

/// Error loading the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read user registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse user registry: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("user registry entry has an empty username")]
    EmptyUsername,
    #[error("duplicate user in registry: {0}")]
    Duplicate(String),
}

/// Immutable username → password hash lookup.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: HashMap<String, String>,
}

impl UserRegistry {
    pub fn from_entries(entries: Vec<UserEntry>) -> Result<Self, RegistryError> {
        let mut users = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.username.is_empty() {
                return Err(RegistryError::EmptyUsername);
            }
            if users.contains_key(&entry.username) {
                return Err(RegistryError::Duplicate(entry.username));
            }
            users.insert(entry.username, entry.password_hash);
        }
        Ok(Self { users })
    }

    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_yaml::from_str(text)?;
        Self::from_entries(file.users)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    pub fn password_hash(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    /// Iterate over the stored hashes.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.users.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_password_hash_field() {
        let registry = UserRegistry::from_yaml(
            "users:\n  - username: alice\n    passwordHash: hash-a\n  - username: bob\n    passwordHash: hash-b\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.password_hash("alice"), Some("hash-a"));
        assert_eq!(registry.password_hash("carol"), None);
    }

    #[test]
    fn accepts_password_alias() {
        let registry =
            UserRegistry::from_yaml("users:\n- username: admin\n  password: $2b$10$abc\n").unwrap();
        assert_eq!(registry.password_hash("admin"), Some("$2b$10$abc"));
    }

    #[test]
    fn accepts_json_documents() {
        let registry =
            UserRegistry::from_yaml(r#"{"users":[{"username":"a","passwordHash":"h"}]}"#).unwrap();
        assert_eq!(registry.password_hash("a"), Some("h"));
    }

    #[test]
    fn rejects_duplicate_users() {
        let result = UserRegistry::from_entries(vec![
            UserEntry {
                username: "a".into(),
                password_hash: "h1".into(),
            },
            UserEntry {
                username: "a".into(),
                password_hash: "h2".into(),
            },
        ]);
        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "a"));
    }

    #[test]
    fn rejects_empty_username() {
        let result = UserRegistry::from_yaml("users:\n- username: ''\n  passwordHash: h\n");
        assert!(matches!(result, Err(RegistryError::EmptyUsername)));
    }

    #[test]
    fn missing_users_key_is_empty_registry() {
        assert!(UserRegistry::from_yaml("{}").unwrap().is_empty());
    }
}
