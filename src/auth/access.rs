// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-domain read/write decisions.
//!
//! ## Access Hierarchy
//!
//! With RBAC enabled, from most to least privileged:
//!
//! - admin: read and write every domain
//! - write-group member: read and write
//! - read-group member: read only
//! - authenticated non-member: nothing
//! - unauthenticated: nothing
//!
//! With RBAC disabled every caller may read and write every domain; domain
//! group declarations are not consulted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::context::{PublicAuthContext, UserAuthContext};
use super::groups::parse_group_list;
use crate::domain::{Domain, DomainAccessMetadata};

/// Outcome of one access evaluation. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainAccess {
    pub can_read: bool,
    pub can_write: bool,
}

impl DomainAccess {
    pub const FULL: DomainAccess = DomainAccess {
        can_read: true,
        can_write: true,
    };

    pub const NONE: DomainAccess = DomainAccess {
        can_read: false,
        can_write: false,
    };
}

/// Identity view consumed by the evaluator.
pub trait AccessSubject {
    fn rbac_enabled(&self) -> bool;
    fn is_admin(&self) -> bool;
    fn is_authenticated(&self) -> bool;
    fn groups(&self) -> &[String];
}

impl AccessSubject for UserAuthContext {
    fn rbac_enabled(&self) -> bool {
        self.rbac_enabled
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

impl AccessSubject for PublicAuthContext {
    fn rbac_enabled(&self) -> bool {
        self.rbac_enabled
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Compute what `subject` may do on `domain`.
pub fn get_domain_access_for_user<S: AccessSubject + ?Sized>(
    domain: &Domain,
    subject: &S,
) -> DomainAccess {
    evaluate_domain_access(&domain.access_metadata(), subject)
}

/// Compute access from already-extracted domain metadata.
pub fn evaluate_domain_access<S: AccessSubject + ?Sized>(
    metadata: &DomainAccessMetadata,
    subject: &S,
) -> DomainAccess {
    if !subject.rbac_enabled() || subject.is_admin() {
        return DomainAccess::FULL;
    }
    if !subject.is_authenticated() {
        return DomainAccess::NONE;
    }

    let read_groups = parse_group_list(metadata.read_groups.as_deref());
    let write_groups = parse_group_list(metadata.write_groups.as_deref());
    if read_groups.is_empty() && write_groups.is_empty() {
        return DomainAccess::NONE;
    }

    // Write-only domains let writers read.
    let readable_by: &[String] = if read_groups.is_empty() {
        &write_groups
    } else {
        &read_groups
    };

    let has_write_group = is_member(subject.groups(), &write_groups);
    let has_read_group = is_member(subject.groups(), readable_by);

    DomainAccess {
        can_read: has_read_group || has_write_group,
        can_write: has_write_group,
    }
}

fn is_member(user_groups: &[String], groups: &[String]) -> bool {
    groups.iter().any(|g| user_groups.contains(g))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(rbac_enabled: bool, is_admin: bool, groups: &[&str], token: Option<&str>) -> UserAuthContext {
        UserAuthContext {
            rbac_enabled,
            is_admin,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            token: token.map(str::to_string),
            ..Default::default()
        }
    }

    fn member(groups: &[&str]) -> UserAuthContext {
        user(true, false, groups, Some("abc"))
    }

    fn read_write_domain() -> Domain {
        Domain::new("test")
            .with_data("READ_GROUPS", r#"["reader"]"#)
            .with_data("WRITE_GROUPS", r#"["writer"]"#)
    }

    fn write_only_domain() -> Domain {
        Domain::new("test").with_data("WRITE_GROUPS", r#"["writer"]"#)
    }

    #[test]
    fn rbac_disabled_opens_every_domain() {
        let open = Domain::new("open");
        assert_eq!(get_domain_access_for_user(&open, &user(false, false, &[], Some("abc"))), DomainAccess::FULL);
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &user(false, false, &[], Some("abc"))), DomainAccess::FULL);
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &user(false, false, &[], None)), DomainAccess::FULL);
    }

    #[test]
    fn admins_get_full_access() {
        let domain = Domain::new("test").with_data("READ_GROUPS", r#"["worker"]"#);
        assert_eq!(get_domain_access_for_user(&domain, &user(true, true, &[], None)), DomainAccess::FULL);
        assert_eq!(get_domain_access_for_user(&domain, &user(true, true, &[], Some("abc"))), DomainAccess::FULL);
    }

    #[test]
    fn unauthenticated_users_are_denied() {
        assert_eq!(get_domain_access_for_user(&Domain::new("open"), &user(true, false, &[], None)), DomainAccess::NONE);
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &user(true, false, &["reader"], None)), DomainAccess::NONE);
    }

    #[test]
    fn domains_without_groups_deny_members() {
        assert_eq!(get_domain_access_for_user(&Domain::new("open"), &member(&["anything"])), DomainAccess::NONE);
    }

    #[test]
    fn read_group_grants_read_only() {
        let access = get_domain_access_for_user(&read_write_domain(), &member(&["reader"]));
        assert_eq!(access, DomainAccess { can_read: true, can_write: false });
    }

    #[test]
    fn write_group_grants_read_and_write() {
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &member(&["writer"])), DomainAccess::FULL);
    }

    #[test]
    fn non_members_are_denied() {
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &member(&[])), DomainAccess::NONE);
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &member(&["other"])), DomainAccess::NONE);
    }

    #[test]
    fn write_only_domain_requires_write_group() {
        assert_eq!(get_domain_access_for_user(&write_only_domain(), &member(&[])), DomainAccess::NONE);
        assert_eq!(get_domain_access_for_user(&write_only_domain(), &member(&["writer"])), DomainAccess::FULL);
    }

    #[test]
    fn read_only_domain_treats_readers_as_viewers() {
        let domain = Domain::new("test").with_data("READ_GROUPS", r#"["viewer"]"#);
        let access = get_domain_access_for_user(&domain, &member(&["viewer"]));
        assert_eq!(access, DomainAccess { can_read: true, can_write: false });
    }

    #[test]
    fn supports_public_context() {
        let public = PublicAuthContext {
            rbac_enabled: true,
            token_source: None,
            groups: vec!["writer".to_string()],
            is_admin: false,
            user_name: None,
            id: None,
            expires_at_ms: None,
            is_authenticated: true,
        };
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &public), DomainAccess::FULL);

        let anonymous = PublicAuthContext {
            is_authenticated: false,
            ..public
        };
        assert_eq!(get_domain_access_for_user(&read_write_domain(), &anonymous), DomainAccess::NONE);
    }

    #[test]
    fn parses_space_separated_metadata() {
        let domain = Domain::new("test")
            .with_data("READ_GROUPS", "reader viewer")
            .with_data("WRITE_GROUPS", "writer");
        assert_eq!(get_domain_access_for_user(&domain, &member(&["writer"])), DomainAccess::FULL);
        let access = get_domain_access_for_user(&domain, &member(&["viewer"]));
        assert_eq!(access, DomainAccess { can_read: true, can_write: false });
    }

    #[test]
    fn accepts_alternate_key_casings() {
        let domain = Domain::new("test")
            .with_data("read_groups", "reader")
            .with_data("writeGroups", "writer");
        let access = get_domain_access_for_user(&domain, &member(&["reader"]));
        assert_eq!(access, DomainAccess { can_read: true, can_write: false });
    }

    #[test]
    fn access_serializes_camel_case() {
        let json = serde_json::to_value(DomainAccess::FULL).unwrap();
        assert_eq!(json, serde_json::json!({"canRead": true, "canWrite": true}));
    }
}
