// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfigKey;
use crate::grpc::channel_credentials;
use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the configuration source answers.
    pub config: String,
    /// Backend channel credentials ("tls", "insecure" or "uninitialized").
    pub backend_channel: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_config(state: &AppState) -> String {
    match state.config.get_config_value(ConfigKey::RbacEnabled).await {
        Ok(_) => "ok".to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

fn check_backend_channel() -> String {
    channel_credentials()
        .map(|c| c.mode())
        .unwrap_or("uninitialized")
        .to_string()
}

/// Health check endpoint handler.
///
/// Returns 200 if the configuration source answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let config = check_config(&state).await;
    let all_ok = config == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            config,
            backend_channel: check_backend_channel(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ConfigSource, StaticConfigSource};
    use crate::domain::InMemoryDomainDirectory;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FailingConfig;

    #[async_trait]
    impl ConfigSource for FailingConfig {
        async fn get_config_value(&self, _key: ConfigKey) -> Result<Option<String>, ConfigError> {
            Err(ConfigError::Unavailable("offline".to_string()))
        }
    }

    fn state(config: Arc<dyn ConfigSource>) -> AppState {
        AppState::new(config, Arc::new(InMemoryDomainDirectory::new()))
    }

    #[tokio::test]
    async fn healthy_with_working_config() {
        let (status, Json(body)) = health(State(state(Arc::new(StaticConfigSource::new())))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.config, "ok");
    }

    #[tokio::test]
    async fn degraded_when_config_fails() {
        let (status, Json(body)) = readiness(State(state(Arc::new(FailingConfig)))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.config, "unavailable");
    }

    #[tokio::test]
    async fn liveness_always_ok() {
        assert_eq!(liveness().await.0.status, "ok");
    }
}
