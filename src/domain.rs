// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Workflow domains and their access-control metadata.
//!
//! A domain carries a free-form string key/value bag. Two entries in it
//! declare which groups may read and write the domain; several key spellings
//! are accepted for compatibility with older tooling.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::grpc::GrpcMetadata;

/// Accepted keys for the read-group list, highest priority first.
pub const READ_GROUP_KEYS: [&str; 3] = ["READ_GROUPS", "read_groups", "readGroups"];

/// Accepted keys for the write-group list, highest priority first.
pub const WRITE_GROUP_KEYS: [&str; 3] = ["WRITE_GROUPS", "write_groups", "writeGroups"];

/// A workflow domain as described by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Domain {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl Domain {
    /// New domain with a random id and no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            data: HashMap::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn access_metadata(&self) -> DomainAccessMetadata {
        DomainAccessMetadata::from_data(&self.data)
    }
}

/// Raw read/write group declarations of a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAccessMetadata {
    pub read_groups: Option<String>,
    pub write_groups: Option<String>,
}

impl DomainAccessMetadata {
    /// Pick the first non-empty entry for each list from the data bag.
    pub fn from_data(data: &HashMap<String, String>) -> Self {
        Self {
            read_groups: first_present(data, &READ_GROUP_KEYS),
            write_groups: first_present(data, &WRITE_GROUP_KEYS),
        }
    }
}

fn first_present(data: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Domain lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum DomainLookupError {
    #[error("domain {0} not found")]
    NotFound(String),
    #[error("domain backend unavailable: {0}")]
    Unavailable(String),
}

/// Source of domain descriptions.
///
/// `metadata` is the caller's outbound credential metadata, forwarded to the
/// backend so it can authorize the lookup itself.
#[async_trait]
pub trait DomainDirectory: Send + Sync {
    async fn describe_domain(
        &self,
        name: &str,
        metadata: Option<&GrpcMetadata>,
    ) -> Result<Domain, DomainLookupError>;
}

/// Domain directory held in memory.
#[derive(Default)]
pub struct InMemoryDomainDirectory {
    domains: RwLock<HashMap<String, Domain>>,
}

impl InMemoryDomainDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains(domains: impl IntoIterator<Item = Domain>) -> Self {
        Self {
            domains: RwLock::new(domains.into_iter().map(|d| (d.name.clone(), d)).collect()),
        }
    }

    /// Load a JSON array of domains.
    pub fn from_json_file(path: &Path) -> Result<Self, DomainLookupError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainLookupError::Unavailable(format!("reading {}: {e}", path.display()))
        })?;
        let domains: Vec<Domain> = serde_json::from_str(&raw).map_err(|e| {
            DomainLookupError::Unavailable(format!("parsing {}: {e}", path.display()))
        })?;
        Ok(Self::with_domains(domains))
    }

    pub async fn insert(&self, domain: Domain) {
        self.domains.write().await.insert(domain.name.clone(), domain);
    }

    pub async fn len(&self) -> usize {
        self.domains.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.domains.read().await.is_empty()
    }
}

#[async_trait]
impl DomainDirectory for InMemoryDomainDirectory {
    async fn describe_domain(
        &self,
        name: &str,
        _metadata: Option<&GrpcMetadata>,
    ) -> Result<Domain, DomainLookupError> {
        self.domains
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| DomainLookupError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn uppercase_keys_take_priority() {
        let domain = Domain::new("orders")
            .with_data("read_groups", "legacy")
            .with_data("READ_GROUPS", r#"["reader"]"#)
            .with_data("writeGroups", "writer");

        let metadata = domain.access_metadata();
        assert_eq!(metadata.read_groups.as_deref(), Some(r#"["reader"]"#));
        assert_eq!(metadata.write_groups.as_deref(), Some("writer"));
    }

    #[test]
    fn empty_values_fall_through_to_next_key() {
        let domain = Domain::new("orders")
            .with_data("READ_GROUPS", "")
            .with_data("readGroups", "viewer");
        assert_eq!(domain.access_metadata().read_groups.as_deref(), Some("viewer"));
    }

    #[test]
    fn no_declarations_yield_empty_metadata() {
        assert_eq!(Domain::new("open").access_metadata(), DomainAccessMetadata::default());
    }

    #[tokio::test]
    async fn in_memory_directory_lookup() {
        assert!(InMemoryDomainDirectory::new().is_empty().await);

        let directory = InMemoryDomainDirectory::with_domains([Domain::new("orders")]);
        assert!(!directory.is_empty().await);
        directory.insert(Domain::new("billing")).await;

        assert_eq!(directory.len().await, 2);
        assert_eq!(directory.describe_domain("orders", None).await.unwrap().name, "orders");
        assert!(matches!(
            directory.describe_domain("missing", None).await,
            Err(DomainLookupError::NotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn loads_domains_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"1","name":"orders","data":{{"READ_GROUPS":"reader"}}}},{{"id":"2","name":"open"}}]"#
        )
        .unwrap();

        let directory = InMemoryDomainDirectory::from_json_file(file.path()).unwrap();
        let domains = directory.domains.try_read().unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains["orders"].data["READ_GROUPS"], "reader");
        assert!(domains["open"].data.is_empty());
    }

    #[test]
    fn missing_json_file_is_an_error() {
        let result = InMemoryDomainDirectory::from_json_file(Path::new("/nonexistent/domains.json"));
        assert!(matches!(result, Err(DomainLookupError::Unavailable(_))));
    }
}
