// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and unverified payload decoding.
//!
//! Tokens are issued and signed by an upstream identity provider. This
//! service never verifies signatures; it only reads the payload segment to
//! learn who the caller claims to be. The backend re-validates the token on
//! every call it receives.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims decoded from a token payload.
///
/// An open mapping from claim name to value. Recognized claims are exposed
/// through accessors; everything else is preserved but unused. The content
/// is untrusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CadenceJwtClaims(Map<String, Value>);

impl CadenceJwtClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `true` only when the claim is the JSON boolean `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Value::Bool(true)))
    }

    /// Claim as a non-empty string.
    pub fn non_empty_str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The `Admin` claim, strictly boolean.
    pub fn is_admin(&self) -> bool {
        self.flag("Admin")
    }

    /// Expiry (`exp`, seconds since epoch) in epoch milliseconds.
    pub fn expires_at_ms(&self) -> Option<i64> {
        let Some(Value::Number(exp)) = self.0.get("exp") else {
            return None;
        };
        exp.as_i64()
            .map(|secs| secs.saturating_mul(1000))
            .or_else(|| exp.as_f64().map(|secs| (secs * 1000.0) as i64))
    }

    pub fn name(&self) -> Option<&str> {
        self.non_empty_str("name")
    }

    pub fn sub(&self) -> Option<&str> {
        self.non_empty_str("sub")
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// Accepts URL-safe or standard base64 with or without padding. Returns
/// `None` when the payload segment is missing, is not valid base64, is not
/// UTF-8, or is not a JSON object.
pub fn decode_cadence_jwt_claims(token: &str) -> Option<CadenceJwtClaims> {
    let payload = token.split('.').nth(1).filter(|p| !p.is_empty())?;

    let mut normalized: String = payload
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let padding = (4 - normalized.len() % 4) % 4;
    normalized.extend(std::iter::repeat('=').take(padding));

    let bytes = Base64::decode_vec(&normalized).ok()?;
    let text = String::from_utf8(bytes).ok()?;

    match serde_json::from_str::<Value>(&text).ok()? {
        Value::Object(claims) => Some(CadenceJwtClaims(claims)),
        _ => None,
    }
}
