// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key/value data endpoints.
//!
//! Store calls are synchronous file I/O and run on the blocking pool.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{MergeResponse, Record, Records, ValueMatch},
    state::AppState,
    storage::{Store, StoreResult},
};

/// Run a store operation off the async workers.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
{
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || op(&store)).await?;
    Ok(result?)
}

#[utoipa::path(
    get,
    path = "/v1/data",
    tag = "Data",
    responses(
        (status = 200, description = "All records", body = Records),
        (status = 401, description = "Unauthorized")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn get_all(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Records>, ApiError> {
    let snapshot = with_store(&state, |store| store.get_all()).await?;
    tracing::debug!(user = %user.username, records = snapshot.len(), "Listed records");
    Ok(Json(snapshot.into()))
}

#[utoipa::path(
    post,
    path = "/v1/data",
    request_body = Records,
    tag = "Data",
    responses(
        (status = 201, description = "Records merged", body = MergeResponse),
        (status = 422, description = "A record cannot be stored in the active format")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn merge(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(Records(entries)): Json<Records>,
) -> Result<(StatusCode, Json<MergeResponse>), ApiError> {
    let written = with_store(&state, move |store| store.merge(entries)).await?;
    tracing::info!(user = %user.username, written, "Merged records");
    Ok((StatusCode::CREATED, Json(MergeResponse { written })))
}

#[utoipa::path(
    get,
    path = "/v1/data/{key}",
    params(("key" = String, Path, description = "Record key")),
    tag = "Data",
    responses(
        (status = 200, description = "Values stored under the key", body = Vec<String>),
        (status = 404, description = "Key not found")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn get_values(
    Auth(_user): Auth,
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let values = with_store(&state, move |store| store.get_values(&key)).await?;
    Ok(Json(values))
}

#[utoipa::path(
    get,
    path = "/v1/data/{key}/{value}",
    params(
        ("key" = String, Path, description = "Record key"),
        ("value" = String, Path, description = "Value to look for")
    ),
    tag = "Data",
    responses(
        (status = 200, description = "The key holds the value", body = ValueMatch),
        (status = 404, description = "Key or value not found")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn get_value(
    Auth(_user): Auth,
    Path((key, value)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ValueMatch>, ApiError> {
    let (k, v) = (key.clone(), value.clone());
    let present = with_store(&state, move |store| store.get_value(&k, &v)).await?;
    Ok(Json(ValueMatch {
        key,
        value,
        present,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/data/{key}",
    params(("key" = String, Path, description = "Record key")),
    request_body = Vec<String>,
    tag = "Data",
    responses(
        (status = 201, description = "Record created", body = Record),
        (status = 409, description = "Key already exists"),
        (status = 422, description = "Record cannot be stored in the active format")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn insert(
    Auth(user): Auth,
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(values): Json<Vec<String>>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = Record { key, values };
    let (k, v) = (record.key.clone(), record.values.clone());
    with_store(&state, move |store| store.insert(&k, v)).await?;
    tracing::info!(user = %user.username, key = %record.key, "Record inserted");
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/v1/data/{key}",
    params(("key" = String, Path, description = "Record key")),
    request_body = Vec<String>,
    tag = "Data",
    responses(
        (status = 200, description = "Record replaced", body = Record),
        (status = 404, description = "Key not found"),
        (status = 422, description = "Record cannot be stored in the active format")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn replace(
    Auth(user): Auth,
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(values): Json<Vec<String>>,
) -> Result<Json<Record>, ApiError> {
    let record = Record { key, values };
    let (k, v) = (record.key.clone(), record.values.clone());
    with_store(&state, move |store| store.replace(&k, v)).await?;
    tracing::info!(user = %user.username, key = %record.key, "Record replaced");
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/v1/data/{key}",
    params(("key" = String, Path, description = "Record key")),
    tag = "Data",
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Key not found")
    ),
    security(("basic" = []), ("bearer" = []))
)]
pub async fn remove(
    Auth(user): Auth,
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let k = key.clone();
    with_store(&state, move |store| store.remove(&k)).await?;
    tracing::info!(user = %user.username, key = %key, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}
