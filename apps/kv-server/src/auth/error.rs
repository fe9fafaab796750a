// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every rejection reaches the client as the same `401 Unauthorized` body.
//! The specific variant is only exposed through [`AuthError::error_code`]
//! for server-side logging.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No username/password presented (credential mode)
    MissingCredentials,
    /// Username/password did not verify
    InvalidCredentials,
    /// No bearer token presented (token mode)
    MissingToken,
    /// Authorization header present but unparseable
    InvalidAuthHeader,
    /// Authorization header unparseable while the gate expects a bearer token
    InvalidBearerHeader,
    /// Token could not be decoded
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

const BASIC_CHALLENGE: &str = "Basic realm=\"kv\"";
const BEARER_CHALLENGE: &str = "Bearer realm=\"kv\"";

impl AuthError {
    /// Get the error code for this error (logging only).
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidBearerHeader => "invalid_bearer_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn challenge(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidCredentials
            | AuthError::InvalidAuthHeader => Some(BASIC_CHALLENGE),
            AuthError::MissingToken
            | AuthError::InvalidBearerHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired => Some(BEARER_CHALLENGE),
            AuthError::InternalError(_) => None,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Credentials are required"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::MissingToken => write!(f, "Bearer token is required"),
            AuthError::InvalidAuthHeader => write!(f, "Invalid authorization header format"),
            AuthError::InvalidBearerHeader => write!(f, "Invalid bearer authorization header"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = if status == StatusCode::UNAUTHORIZED {
            "Unauthorized"
        } else {
            "Internal server error"
        };

        let mut response = (status, Json(AuthErrorBody { error })).into_response();
        if let Some(challenge) = self.challenge() {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}
