// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the caller's auth context.
//!
//! Use the `Auth` extractor in handlers that need to know who is calling:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx is UserAuthContext, possibly unauthenticated
//! }
//! ```
//!
//! The extractor never rejects an anonymous caller. It only fails when the
//! configuration source does.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, UserAuthContext};
use crate::state::AppState;

/// Extractor for the resolved auth context.
///
/// Reuses the context the `user_info` middleware stored in the request
/// extensions; resolves it from the request cookies otherwise.
pub struct Auth(pub UserAuthContext);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<UserAuthContext>().cloned() {
            return Ok(Auth(ctx));
        }

        let ctx = state.resolve_auth(&parts.headers).await?;
        Ok(Auth(ctx))
    }
}
