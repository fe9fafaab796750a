// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    models::{LoginRequest, LoginResponse, MergeResponse, Record, Records, ValueMatch},
    state::AppState,
};

pub mod data;
pub mod health;
pub mod login;

pub fn router(state: AppState) -> Router {
    let data_routes = Router::new()
        .route("/data", get(data::get_all).post(data::merge))
        .route(
            "/data/{key}",
            get(data::get_values)
                .post(data::insert)
                .put(data::replace)
                .delete(data::remove),
        )
        .route("/data/{key}/{value}", get(data::get_value))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let v1_routes = Router::new()
        .merge(data_routes)
        .route("/login", post(login::login));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        data::get_all,
        data::merge,
        data::get_values,
        data::get_value,
        data::insert,
        data::replace,
        data::remove,
        login::login,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Records,
            Record,
            ValueMatch,
            MergeResponse,
            LoginRequest,
            LoginResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Data", description = "Key/value records"),
        (name = "Auth", description = "Login and session tokens"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
