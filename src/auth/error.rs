// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Token problems never show up here: malformed, expired, or missing tokens
//! resolve to an unauthenticated context. These errors cover the token
//! submission endpoint and a failing configuration source.

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ConfigError;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// Token submission without a usable token
    MissingToken,
    /// Token submission body could not be parsed
    InvalidRequestBody,
    /// The configuration source failed while resolving the caller
    ConfigUnavailable(String),
}

/// `message` repeats `error` for browser clients reading `{message}`.
#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
    message: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidRequestBody => "invalid_request_body",
            AuthError::ConfigUnavailable(_) => "config_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidRequestBody => StatusCode::BAD_REQUEST,
            AuthError::ConfigUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "A valid token is required"),
            AuthError::InvalidRequestBody => write!(f, "Invalid request body"),
            AuthError::ConfigUnavailable(msg) => {
                write!(f, "Authentication configuration unavailable: {msg}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        AuthError::ConfigUnavailable(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::ConfigUnavailable(ref msg) = self {
            tracing::warn!(error = %msg, "Auth context resolution failed");
        }
        let status = self.status_code();
        let message = self.to_string();
        let body = Json(AuthErrorBody {
            error: message.clone(),
            error_code: self.error_code().to_string(),
            message,
        });
        let mut response = (status, body).into_response();
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
