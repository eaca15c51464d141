// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend call plumbing: per-call credential metadata and channel
//! credentials.

pub mod tls;

use std::collections::BTreeMap;

pub use tls::{channel_credentials, initialize_tls, ChannelCredentials, TlsError};

/// Metadata key carrying the caller's token on backend calls.
pub const AUTH_METADATA_KEY: &str = "cadence-authorization";

/// Key/value metadata attached to an outbound backend call.
pub type GrpcMetadata = BTreeMap<String, String>;

/// Overlay `auth` onto `existing`; auth entries replace same-named ones.
pub fn merge_grpc_metadata(existing: Option<GrpcMetadata>, auth: GrpcMetadata) -> GrpcMetadata {
    let mut merged = existing.unwrap_or_default();
    merged.extend(auth);
    merged
}
