// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to every data route, so a rejected request
//! never reaches a handler or the store.
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/data", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{gate::Presented, AccessGate, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Reject unauthenticated requests; otherwise attach [`AuthenticatedUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = match state.gate.presented(request.headers()) {
        Ok(presented) => presented,
        Err(e) => return reject(e, request.uri().path()),
    };

    match authorize(Arc::clone(&state.gate), presented).await {
        Ok(user) => {
            tracing::debug!(user = %user.username, mode = state.gate.mode(), "Request authorized");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => reject(e, request.uri().path()),
    }
}

/// Run the gate check on the blocking pool (bcrypt and HMAC are CPU-bound).
pub async fn authorize(
    gate: Arc<AccessGate>,
    presented: Presented,
) -> Result<AuthenticatedUser, AuthError> {
    tokio::task::spawn_blocking(move || gate.check(&presented))
        .await
        .map_err(|e| AuthError::InternalError(format!("auth task failed: {e}")))?
}

fn reject(error: AuthError, path: &str) -> Response {
    match &error {
        AuthError::InternalError(msg) => {
            tracing::error!(error_code = error.error_code(), path, "Authentication failed: {msg}");
        }
        _ => {
            tracing::warn!(error_code = error.error_code(), path, "Request rejected");
        }
    }
    error.into_response()
}
