// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module decides who is calling the workflow console and what they may
//! do on each domain.
//!
//! ## Auth Flow
//!
//! 1. The browser submits an identity-provider token to `POST /api/auth/token`
//! 2. The server stores it in the HTTP-only `cadence-authorization` cookie
//! 3. On every request the server:
//!    - Reads the RBAC flag from configuration
//!    - Decodes the cookie token's claims (no signature verification)
//!    - Drops expired or undecodable tokens
//!    - Extracts:
//!      - `Admin` → admin flag
//!      - `name` / `sub` → user name
//!      - `groups` / `Groups` → group memberships
//! 4. Domain access is computed per domain from its read/write groups
//! 5. The raw token is forwarded to the backend as call metadata
//!
//! ## Security
//!
//! - The raw token never leaves the server except toward the backend
//! - The browser only ever sees [`PublicAuthContext`]
//! - The backend performs signature verification on every call

pub mod access;
pub mod claims;
pub mod context;
pub mod cookies;
pub mod error;
pub mod extractor;
pub mod groups;
pub mod middleware;

pub use access::{get_domain_access_for_user, AccessSubject, DomainAccess};
pub use claims::{decode_cadence_jwt_claims, CadenceJwtClaims};
pub use context::{
    get_grpc_metadata_from_auth, get_public_auth_context, resolve_auth_context, AuthTokenSource,
    PublicAuthContext, ResolutionPolicy, UserAuthContext,
};
pub use cookies::{CookieReader, CADENCE_AUTH_COOKIE_NAME};
pub use error::AuthError;
pub use extractor::Auth;
