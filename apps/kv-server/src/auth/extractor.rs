// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{middleware::authorize, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Uses the identity attached by [`require_auth`](super::middleware::require_auth)
/// when present, otherwise runs the access gate itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let presented = state.gate.presented(&parts.headers)?;
        let user = authorize(Arc::clone(&state.gate), presented).await?;
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gate::test_support::{basic_gate, PASSWORD, USERNAME};
    use crate::storage::{codec::JsonCodec, Store};
    use axum::http::Request;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::new(temp_dir.path().join("db.json"), Arc::new(JsonCodec));
        (AppState::new(store, basic_gate()), temp_dir)
    }

    #[tokio::test]
    async fn auth_extractor_requires_credentials() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn auth_extractor_verifies_basic_credentials() {
        let (state, _temp_dir) = create_test_state();
        let header = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", header)
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, USERNAME);
        assert!(parts.extensions.get::<AuthenticatedUser>().is_some());
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _temp_dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts
            .extensions
            .insert(AuthenticatedUser::from_credentials("user_from_middleware"));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "user_from_middleware");
    }
}
