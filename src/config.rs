// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines the configuration values read by the auth layer and
//! the [`ConfigSource`] abstraction they are read through. Values may come
//! from the process environment or from any asynchronous source (a remote
//! dynamic-config service, a cache); the auth layer awaits exactly one read
//! per value per request.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CADENCE_WEB_RBAC_ENABLED` | Enforce group-based domain access (`true`/`1`) | `false` |
//! | `CADENCE_ADMIN_SECURITY_TOKEN` | Static token for deployments without cookie login | empty |
//! | `CADENCE_WEB_AUTH_TOKEN_SOURCES` | Token sources in precedence order (`cookie`, `env`) | `cookie` |
//! | `CADENCE_GRPC_TLS_CA_FILE` | CA bundle for backend channel TLS | unset (insecure) |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `CADENCE_WEB_PORT` | Server bind port | `3000` |
//! | `CADENCE_WEB_DOMAINS_FILE` | JSON file seeding the domain directory | unset (empty) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;

use async_trait::async_trait;

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// A configuration value consumed by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Whether role-based access control is enforced.
    RbacEnabled,
    /// Fallback static token for deployments without cookie-based login.
    AdminSecurityToken,
    /// Comma-separated token sources, highest precedence first.
    AuthTokenSources,
    /// Path to a PEM CA bundle for the backend channel.
    GrpcTlsCaFile,
    /// Bind address.
    Host,
    /// Bind port.
    Port,
    /// JSON file of domain descriptions loaded at startup.
    DomainsFile,
}

impl ConfigKey {
    /// Environment variable backing this key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::RbacEnabled => "CADENCE_WEB_RBAC_ENABLED",
            ConfigKey::AdminSecurityToken => "CADENCE_ADMIN_SECURITY_TOKEN",
            ConfigKey::AuthTokenSources => "CADENCE_WEB_AUTH_TOKEN_SOURCES",
            ConfigKey::GrpcTlsCaFile => "CADENCE_GRPC_TLS_CA_FILE",
            ConfigKey::Host => "HOST",
            ConfigKey::Port => "CADENCE_WEB_PORT",
            ConfigKey::DomainsFile => "CADENCE_WEB_DOMAINS_FILE",
        }
    }

    /// Value used when the source has nothing for this key.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            ConfigKey::RbacEnabled => Some("false"),
            ConfigKey::AdminSecurityToken => Some(""),
            ConfigKey::AuthTokenSources => Some("cookie"),
            ConfigKey::GrpcTlsCaFile => None,
            ConfigKey::Host => Some("0.0.0.0"),
            ConfigKey::Port => Some("3000"),
            ConfigKey::DomainsFile => None,
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Failure reading from a configuration source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("config value {key} is not valid unicode")]
    NotUnicode { key: ConfigKey },
    #[error("config source unavailable: {0}")]
    Unavailable(String),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: ConfigKey, value: String },
}

/// Asynchronous source of configuration values.
///
/// `Ok(None)` means the key is unset; errors are reserved for the source
/// itself failing and are propagated to the caller unchanged.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn get_config_value(&self, key: ConfigKey) -> Result<Option<String>, ConfigError>;
}

/// Reads configuration from the process environment, falling back to each
/// key's default.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigSource;

#[async_trait]
impl ConfigSource for EnvConfigSource {
    async fn get_config_value(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        match std::env::var(key.env_var()) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(key.default_value().map(str::to_string)),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { key }),
        }
    }
}

/// Fixed in-memory configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    values: HashMap<ConfigKey, String>,
}

impl StaticConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn get_config_value(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        Ok(self
            .values
            .get(&key)
            .cloned()
            .or_else(|| key.default_value().map(str::to_string)))
    }
}

/// Interpret a boolean-like config string: `"true"` (any case) or `"1"`.
pub fn parse_boolean_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_flag_accepts_true_and_one() {
        assert!(parse_boolean_flag("true"));
        assert!(parse_boolean_flag("TRUE"));
        assert!(parse_boolean_flag("True"));
        assert!(parse_boolean_flag("1"));
    }

    #[test]
    fn boolean_flag_rejects_everything_else() {
        assert!(!parse_boolean_flag("false"));
        assert!(!parse_boolean_flag("yes"));
        assert!(!parse_boolean_flag(""));
        assert!(!parse_boolean_flag(" true"));
        assert!(!parse_boolean_flag("0"));
    }

    #[tokio::test]
    async fn static_source_falls_back_to_defaults() {
        let source = StaticConfigSource::new();
        let rbac = source.get_config_value(ConfigKey::RbacEnabled).await.unwrap();
        assert_eq!(rbac.as_deref(), Some("false"));

        let ca = source.get_config_value(ConfigKey::GrpcTlsCaFile).await.unwrap();
        assert!(ca.is_none());
    }

    #[tokio::test]
    async fn static_source_returns_set_values() {
        let source = StaticConfigSource::new().with(ConfigKey::RbacEnabled, "1");
        let rbac = source.get_config_value(ConfigKey::RbacEnabled).await.unwrap();
        assert_eq!(rbac.as_deref(), Some("1"));
    }

    #[test]
    fn keys_map_to_environment_names() {
        assert_eq!(ConfigKey::RbacEnabled.env_var(), "CADENCE_WEB_RBAC_ENABLED");
        assert_eq!(ConfigKey::Port.default_value(), Some("3000"));
        assert_eq!(ConfigKey::AdminSecurityToken.to_string(), "CADENCE_ADMIN_SECURITY_TOKEN");
    }
}
