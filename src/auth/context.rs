// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request auth context resolution.
//!
//! ## Resolution Flow
//!
//! 1. Read the RBAC flag from the config source
//! 2. Take the first non-empty token from the configured token sources
//! 3. Decode the payload claims (no signature verification)
//! 4. Reject expired tokens
//! 5. Derive admin flag, user name, and groups from the claims
//!
//! Undecodable and expired tokens resolve to the same unauthenticated
//! context as a missing token. Only a failing config source is an error.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::claims::{decode_cadence_jwt_claims, CadenceJwtClaims};
use super::cookies::{normalize_token_value, CookieReader, CADENCE_AUTH_COOKIE_NAME};
use super::groups::normalize_group_claim;
use crate::config::{parse_boolean_flag, ConfigError, ConfigKey, ConfigSource};
use crate::grpc::{GrpcMetadata, AUTH_METADATA_KEY};

/// Where the resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthTokenSource {
    /// The `cadence-authorization` request cookie.
    Cookie,
    /// The static admin token from configuration.
    Env,
}

/// How tokens are located and how claims are interpreted.
///
/// Lists are ordered by precedence: the first token source yielding a value
/// wins, and the first claim alias present wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPolicy {
    pub token_sources: Vec<AuthTokenSource>,
    pub group_claims: Vec<String>,
    pub user_name_claims: Vec<String>,
    pub admin_claim: String,
    pub enforce_expiry: bool,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            token_sources: vec![AuthTokenSource::Cookie],
            group_claims: vec!["groups".to_string(), "Groups".to_string()],
            user_name_claims: vec!["name".to_string(), "sub".to_string()],
            admin_claim: "Admin".to_string(),
            enforce_expiry: true,
        }
    }
}

impl ResolutionPolicy {
    /// Default policy with the token source precedence read from
    /// [`ConfigKey::AuthTokenSources`].
    pub async fn from_config(config: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let policy = Self::default();
        match config.get_config_value(ConfigKey::AuthTokenSources).await? {
            Some(raw) => Ok(policy.with_token_sources(parse_token_sources(&raw)?)),
            None => Ok(policy),
        }
    }

    /// Set the token source precedence.
    pub fn with_token_sources(mut self, sources: impl IntoIterator<Item = AuthTokenSource>) -> Self {
        self.token_sources = sources.into_iter().collect();
        self
    }

    /// Set the group claim aliases.
    pub fn with_group_claims<S: Into<String>>(mut self, claims: impl IntoIterator<Item = S>) -> Self {
        self.group_claims = claims.into_iter().map(Into::into).collect();
        self
    }

    /// Set the user name claim aliases.
    pub fn with_user_name_claims<S: Into<String>>(
        mut self,
        claims: impl IntoIterator<Item = S>,
    ) -> Self {
        self.user_name_claims = claims.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_admin_claim(mut self, claim: impl Into<String>) -> Self {
        self.admin_claim = claim.into();
        self
    }

    pub fn with_enforce_expiry(mut self, enforce: bool) -> Self {
        self.enforce_expiry = enforce;
        self
    }

    fn groups(&self, claims: &CadenceJwtClaims) -> Vec<String> {
        self.group_claims
            .iter()
            .filter_map(|alias| claims.get(alias))
            .find(|value| !value.is_null())
            .map(normalize_group_claim)
            .unwrap_or_default()
    }

    fn user_name(&self, claims: &CadenceJwtClaims) -> Option<String> {
        self.user_name_claims
            .iter()
            .find_map(|alias| claims.non_empty_str(alias))
            .map(str::to_string)
    }
}

/// Parse a comma-separated list of token sources (`cookie`, `env`).
fn parse_token_sources(raw: &str) -> Result<Vec<AuthTokenSource>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: ConfigKey::AuthTokenSources,
        value: raw.to_string(),
    };

    let sources = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(AuthTokenSource::Cookie),
            "env" => Ok(AuthTokenSource::Env),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if sources.is_empty() {
        return Err(invalid());
    }
    Ok(sources)
}

/// Resolved identity for one request. Server-private: carries the raw token.
///
/// When `token` is present it was decodable and unexpired at resolution
/// time. When it is absent, no field reflects claims from a rejected token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAuthContext {
    pub rbac_enabled: bool,
    pub token: Option<String>,
    pub token_source: Option<AuthTokenSource>,
    pub groups: Vec<String>,
    pub is_admin: bool,
    pub user_name: Option<String>,
    /// Alias of `user_name`.
    pub id: Option<String>,
    pub expires_at_ms: Option<i64>,
}

impl UserAuthContext {
    /// Context for a caller without a usable token.
    pub fn unauthenticated(rbac_enabled: bool) -> Self {
        Self {
            rbac_enabled,
            ..Default::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Client-safe projection of [`UserAuthContext`].
///
/// This is the only identity representation sent to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicAuthContext {
    pub rbac_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_source: Option<AuthTokenSource>,
    pub groups: Vec<String>,
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
    pub is_authenticated: bool,
}

impl From<&UserAuthContext> for PublicAuthContext {
    fn from(ctx: &UserAuthContext) -> Self {
        Self {
            rbac_enabled: ctx.rbac_enabled,
            token_source: ctx.token_source,
            groups: ctx.groups.clone(),
            is_admin: ctx.is_admin,
            user_name: ctx.user_name.clone(),
            id: ctx.id.clone(),
            expires_at_ms: ctx.expires_at_ms,
            is_authenticated: ctx.token.is_some(),
        }
    }
}

/// Strip the raw token, exposing only whether one was present.
pub fn get_public_auth_context(ctx: &UserAuthContext) -> PublicAuthContext {
    PublicAuthContext::from(ctx)
}

/// Credential metadata for outbound backend calls, or `None` without a token.
pub fn get_grpc_metadata_from_auth(ctx: Option<&UserAuthContext>) -> Option<GrpcMetadata> {
    let token = ctx?.token.as_ref()?;
    Some(GrpcMetadata::from([(
        AUTH_METADATA_KEY.to_string(),
        token.clone(),
    )]))
}

/// Resolve the auth context for a request at the current wall-clock time.
pub async fn resolve_auth_context(
    config: &dyn ConfigSource,
    cookies: &dyn CookieReader,
    policy: &ResolutionPolicy,
) -> Result<UserAuthContext, ConfigError> {
    resolve_auth_context_at(config, cookies, policy, Utc::now().timestamp_millis()).await
}

/// Resolve the auth context as of `now_ms` (epoch milliseconds).
pub async fn resolve_auth_context_at(
    config: &dyn ConfigSource,
    cookies: &dyn CookieReader,
    policy: &ResolutionPolicy,
    now_ms: i64,
) -> Result<UserAuthContext, ConfigError> {
    let rbac_enabled = config
        .get_config_value(ConfigKey::RbacEnabled)
        .await?
        .as_deref()
        .map(parse_boolean_flag)
        .unwrap_or(false);

    let Some((token, source)) = find_token(config, cookies, policy).await? else {
        return Ok(UserAuthContext::unauthenticated(rbac_enabled));
    };

    let Some(claims) = decode_cadence_jwt_claims(&token) else {
        tracing::debug!(source = ?source, "Ignoring undecodable auth token");
        return Ok(UserAuthContext::unauthenticated(rbac_enabled));
    };

    let expires_at_ms = claims.expires_at_ms();
    if policy.enforce_expiry && expires_at_ms.is_some_and(|exp| now_ms >= exp) {
        tracing::debug!(source = ?source, expires_at_ms, "Ignoring expired auth token");
        return Ok(UserAuthContext::unauthenticated(rbac_enabled));
    }

    let user_name = policy.user_name(&claims);
    let ctx = UserAuthContext {
        rbac_enabled,
        token: Some(token),
        token_source: Some(source),
        groups: policy.groups(&claims),
        is_admin: matches!(claims.get(&policy.admin_claim), Some(Value::Bool(true))),
        id: user_name.clone(),
        user_name,
        expires_at_ms,
    };

    tracing::debug!(
        source = ?source,
        user = ctx.user_name.as_deref().unwrap_or("<anonymous>"),
        is_admin = ctx.is_admin,
        groups = ctx.groups.len(),
        "Resolved auth context"
    );

    Ok(ctx)
}

async fn find_token(
    config: &dyn ConfigSource,
    cookies: &dyn CookieReader,
    policy: &ResolutionPolicy,
) -> Result<Option<(String, AuthTokenSource)>, ConfigError> {
    for source in &policy.token_sources {
        let raw = match source {
            AuthTokenSource::Cookie => cookies.get_cookie(CADENCE_AUTH_COOKIE_NAME),
            AuthTokenSource::Env => config.get_config_value(ConfigKey::AdminSecurityToken).await?,
        };
        if let Some(raw) = raw {
            let token = normalize_token_value(&raw);
            if !token.is_empty() {
                return Ok(Some((token.to_string(), *source)));
            }
        }
    }
    Ok(None)
}
