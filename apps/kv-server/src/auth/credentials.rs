// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username/password verification against the bcrypt user registry.

use std::str::FromStr;

use bcrypt::HashParts;

use super::users::UserRegistry;

/// Cost used for new hashes and for the unknown-user decoy when the
/// registry holds no parseable hash.
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash a password for a registry entry.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Highest bcrypt cost found in the registry.
///
/// Unknown users are never cheaper to reject than the most expensive
/// known user.
fn decoy_cost(registry: &UserRegistry) -> u32 {
    registry
        .hashes()
        .filter_map(|hash| HashParts::from_str(hash).ok())
        .map(|parts| parts.get_cost())
        .max()
        .unwrap_or(DEFAULT_HASH_COST)
}

/// Checks (username, password) pairs.
///
/// An unknown username still pays for one bcrypt verification against a
/// decoy hash of the registry's highest cost, so the result and its timing look
/// the same as a wrong password.
pub struct CredentialVerifier {
    registry: UserRegistry,
    decoy_hash: String,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("users", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    pub fn new(registry: UserRegistry) -> Result<Self, bcrypt::BcryptError> {
        let cost = decoy_cost(&registry);
        let decoy_hash = bcrypt::hash("decoy-password-never-matches", cost)?;
        Ok(Self {
            registry,
            decoy_hash,
        })
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    /// `true` only when the user exists and the password matches.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(hash) = self.registry.password_hash(username) else {
            let _ = bcrypt::verify(password, &self.decoy_hash);
            return false;
        };

        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }
}
