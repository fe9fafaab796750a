// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and the authenticated user representation.

use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// How the caller proved their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Credentials,
    Token,
}

/// Identity resolved by the access gate, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub method: AuthMethod,
    /// Token expiry, when authenticated by token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl AuthenticatedUser {
    pub fn from_credentials(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            method: AuthMethod::Credentials,
            expires_at: None,
        }
    }

    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            username: claims.sub,
            method: AuthMethod::Token,
            expires_at: Some(claims.exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_keeps_subject_and_expiry() {
        let user = AuthenticatedUser::from_claims(SessionClaims {
            sub: "alice".into(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        });
        assert_eq!(user.username, "alice");
        assert_eq!(user.method, AuthMethod::Token);
        assert_eq!(user.expires_at, Some(1_700_003_600));
    }

    #[test]
    fn from_credentials_has_no_expiry() {
        let user = AuthenticatedUser::from_credentials("bob");
        assert_eq!(user.method, AuthMethod::Credentials);
        assert!(user.expires_at.is_none());
    }
}
