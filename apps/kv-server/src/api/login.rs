// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    auth::AuthError,
    models::{LoginRequest, LoginResponse},
    state::AppState,
};

/// Verify credentials and, in token mode, issue a session token.
///
/// Unknown users and wrong passwords get the same 401.
#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let gate = Arc::clone(&state.gate);
    let LoginRequest { username, password } = request;

    let response = tokio::task::spawn_blocking(move || {
        if !gate.verifier().verify(&username, &password) {
            return Err(AuthError::InvalidCredentials);
        }
        let issued = gate
            .sessions()
            .map(|sessions| sessions.issue(&username))
            .transpose()?;
        Ok(LoginResponse {
            username,
            token: issued.as_ref().map(|t| t.token.clone()),
            expires_at: issued.map(|t| t.expires_at),
        })
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("login task failed: {e}")))?;

    match response {
        Ok(response) => {
            tracing::info!(user = %response.username, "Login succeeded");
            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!(error_code = e.error_code(), "Login rejected");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::gate::test_support::{basic_gate, token_gate, PASSWORD, USERNAME};
    use crate::auth::AccessGate;
    use crate::storage::{codec::JsonCodec, Store};
    use tempfile::TempDir;

    fn state(gate: AccessGate) -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("db.json"), Arc::new(JsonCodec));
        (AppState::new(store, gate), dir)
    }

    fn request(username: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            username: username.into(),
            password: password.into(),
        })
    }

    #[tokio::test]
    async fn token_mode_issues_verifiable_token() {
        let (state, _dir) = state(token_gate());

        let Json(response) = login(State(state.clone()), request(USERNAME, PASSWORD))
            .await
            .unwrap();
        let token = response.token.expect("token mode returns a token");
        assert!(response.expires_at.is_some());

        let claims = state.gate.sessions().unwrap().verify(&token).unwrap();
        assert_eq!(claims.sub, USERNAME);
    }

    #[tokio::test]
    async fn basic_mode_reports_success_without_token() {
        let (state, _dir) = state(basic_gate());

        let Json(response) = login(State(state), request(USERNAME, PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.username, USERNAME);
        assert!(response.token.is_none());
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let (state, _dir) = state(token_gate());

        let unknown = login(State(state.clone()), request("mallory", PASSWORD))
            .await
            .unwrap_err();
        let wrong = login(State(state), request(USERNAME, "guess"))
            .await
            .unwrap_err();
        assert_eq!(unknown, AuthError::InvalidCredentials);
        assert_eq!(unknown, wrong);
    }
}
