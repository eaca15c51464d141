// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::user_info, AuthTokenSource, DomainAccess, PublicAuthContext},
    domain::Domain,
    state::AppState,
};

pub mod auth;
pub mod domains;
pub mod health;

pub fn router(state: AppState) -> Router {
    // Routes that need the resolved caller.
    let resolved_routes = Router::new()
        .route("/auth/me", get(auth::get_me))
        .route("/domains/{domain}/access", get(domains::get_domain_access))
        .layer(from_fn_with_state(state.clone(), user_info));

    let api_routes = Router::new()
        .route("/auth/token", post(auth::set_token).delete(auth::clear_token))
        .merge(resolved_routes)
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::get_me,
        auth::set_token,
        auth::clear_token,
        domains::get_domain_access,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            PublicAuthContext,
            AuthTokenSource,
            DomainAccess,
            Domain,
            auth::SetTokenRequest,
            auth::TokenResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Caller identity and token cookie"),
        (name = "Domains", description = "Per-domain access decisions"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
