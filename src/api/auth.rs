// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth endpoints: current identity and token cookie lifecycle.

use axum::{
    body::Bytes,
    http::{
        header::{CACHE_CONTROL, SET_COOKIE},
        HeaderMap, HeaderValue, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::cookies::{
    auth_cookie_header_value, clear_auth_cookie_header_value, is_secure_request,
    normalize_token_value,
};
use crate::auth::{get_public_auth_context, Auth, AuthError, PublicAuthContext};

/// Request body for POST /api/auth/token
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTokenRequest {
    /// Identity-provider token, optionally prefixed with `Bearer `
    pub token: String,
}

/// Acknowledgement for token endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub ok: bool,
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn ok_with_cookie(cookie: Option<HeaderValue>) -> Response {
    let mut response = Json(TokenResponse { ok: true }).into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    no_store(response)
}

/// Get the caller's client-safe auth context.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current auth context", body = PublicAuthContext),
        (status = 500, description = "Configuration source unavailable"),
    )
)]
pub async fn get_me(Auth(ctx): Auth) -> Json<PublicAuthContext> {
    Json(get_public_auth_context(&ctx))
}

/// Store a token in the auth cookie.
#[utoipa::path(
    post,
    path = "/api/auth/token",
    tag = "Auth",
    request_body = SetTokenRequest,
    responses(
        (status = 200, description = "Cookie set", body = TokenResponse),
        (status = 400, description = "Missing token or invalid body"),
    )
)]
pub async fn set_token(headers: HeaderMap, uri: Uri, body: Bytes) -> Result<Response, AuthError> {
    let body: Value = serde_json::from_slice(&body).map_err(|_| AuthError::InvalidRequestBody)?;

    let token = body
        .get("token")
        .and_then(Value::as_str)
        .map(normalize_token_value)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let cookie = auth_cookie_header_value(token, is_secure_request(&headers, &uri))
        .ok_or(AuthError::MissingToken)?;

    tracing::info!("Auth token cookie set");
    Ok(ok_with_cookie(Some(cookie)))
}

/// Clear the auth cookie.
#[utoipa::path(
    delete,
    path = "/api/auth/token",
    tag = "Auth",
    responses(
        (status = 200, description = "Cookie cleared", body = TokenResponse),
    )
)]
pub async fn clear_token(headers: HeaderMap, uri: Uri) -> Response {
    tracing::info!("Auth token cookie cleared");
    ok_with_cookie(clear_auth_cookie_header_value(is_secure_request(&headers, &uri)))
}
