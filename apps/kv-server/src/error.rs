// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::{CodecError, StoreError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::not_found(format!("Not found: {what}")),
            StoreError::AlreadyExists(what) => {
                ApiError::conflict(format!("Already exists: {what}"))
            }
            StoreError::InvalidKey(reason) => ApiError::unprocessable(reason),
            StoreError::Codec(CodecError::Unrepresentable { key, reason, .. }) => {
                ApiError::unprocessable(format!("Record {key} cannot be stored: {reason}"))
            }
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::internal("Storage failure")
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        tracing::error!(error = %e, "Blocking task failed");
        ApiError::internal("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let conflict = ApiError::conflict("dup");
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");
    }

    #[test]
    fn store_errors_map_to_client_statuses() {
        let cases = [
            (StoreError::NotFound("key a".into()), StatusCode::NOT_FOUND),
            (StoreError::AlreadyExists("key a".into()), StatusCode::CONFLICT),
            (StoreError::InvalidKey("empty"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                StoreError::Codec(CodecError::Unrepresentable {
                    format: "plain",
                    key: "a".into(),
                    reason: "value contains whitespace",
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn storage_failures_hide_details() {
        let error = ApiError::from(StoreError::Codec(CodecError::Encryption(
            "decryption failed".into(),
        )));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Storage failure");

        let error = ApiError::from(StoreError::Codec(CodecError::Encode {
            format: "yaml",
            message: "unserializable".into(),
        }));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Storage failure");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::not_found("Not found: key a").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"Not found: key a"}"#);
    }
}
