// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{resolve_auth_context, ResolutionPolicy, UserAuthContext};
use crate::config::{ConfigError, ConfigSource, EnvConfigSource};
use crate::domain::{DomainDirectory, InMemoryDomainDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<dyn ConfigSource>,
    pub domains: Arc<dyn DomainDirectory>,
    pub policy: Arc<ResolutionPolicy>,
}

impl AppState {
    pub fn new(config: Arc<dyn ConfigSource>, domains: Arc<dyn DomainDirectory>) -> Self {
        Self {
            config,
            domains,
            policy: Arc::new(ResolutionPolicy::default()),
        }
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Resolve the caller from the request's cookies.
    pub async fn resolve_auth(&self, headers: &HeaderMap) -> Result<UserAuthContext, ConfigError> {
        resolve_auth_context(self.config.as_ref(), headers, &self.policy).await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(EnvConfigSource),
            Arc::new(InMemoryDomainDirectory::new()),
        )
    }
}
