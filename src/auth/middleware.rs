// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth context middleware for Axum.
//!
//! Resolves the caller once per request and stores the result in the request
//! extensions, together with the credential metadata for backend calls:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/domains/{domain}/access", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), user_info));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{get_grpc_metadata_from_auth, AuthError};
use crate::grpc::{merge_grpc_metadata, GrpcMetadata};
use crate::state::AppState;

/// Attach `UserAuthContext` and `GrpcMetadata` to the request.
///
/// Existing metadata in the extensions is kept; the auth entry overrides a
/// same-named one.
pub async fn user_info(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let ctx = match state.resolve_auth(request.headers()).await {
        Ok(ctx) => ctx,
        Err(e) => return AuthError::from(e).into_response(),
    };

    if let Some(auth_metadata) = get_grpc_metadata_from_auth(Some(&ctx)) {
        let existing = request.extensions_mut().remove::<GrpcMetadata>();
        request
            .extensions_mut()
            .insert(merge_grpc_metadata(existing, auth_metadata));
    }
    request.extensions_mut().insert(ctx);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_tokens::token_with_claims;
    use crate::auth::UserAuthContext;
    use crate::config::{ConfigError, ConfigKey, ConfigSource, StaticConfigSource};
    use crate::domain::InMemoryDomainDirectory;
    use crate::grpc::AUTH_METADATA_KEY;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn echo(
        Extension(ctx): Extension<UserAuthContext>,
        metadata: Option<Extension<GrpcMetadata>>,
    ) -> String {
        let token = metadata
            .and_then(|Extension(m)| m.get(AUTH_METADATA_KEY).cloned())
            .unwrap_or_default();
        format!("{}|{}", ctx.user_name.unwrap_or_default(), token)
    }

    fn app(config: Arc<dyn ConfigSource>) -> Router {
        let state = AppState::new(config, Arc::new(InMemoryDomainDirectory::new()));
        Router::new()
            .route("/echo", get(echo))
            .layer(from_fn_with_state(state.clone(), user_info))
            .with_state(state)
    }

    #[tokio::test]
    async fn stores_context_and_metadata() {
        let token = token_with_claims(json!({"name": "alice"}));
        let config = StaticConfigSource::new().with(ConfigKey::RbacEnabled, "true");

        let response = app(Arc::new(config))
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header("Cookie", format!("cadence-authorization={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), format!("alice|{token}"));
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_metadata() {
        let response = app(Arc::new(StaticConfigSource::new()))
            .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"|");
    }

    struct FailingConfig;

    #[async_trait]
    impl ConfigSource for FailingConfig {
        async fn get_config_value(&self, _key: ConfigKey) -> Result<Option<String>, ConfigError> {
            Err(ConfigError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn config_failure_short_circuits() {
        let response = app(Arc::new(FailingConfig))
            .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
