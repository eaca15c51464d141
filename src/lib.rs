// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cadence Web Auth - Console Authentication & Domain Access
//!
//! This crate resolves who is calling the workflow console from the token
//! held in an HTTP-only cookie, exposes a client-safe view of that identity,
//! and decides per-domain read/write access from group memberships.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token decoding, context resolution and domain access
//! - `config` - Configuration keys and sources
//! - `domain` - Domain descriptions and the directory they are looked up in
//! - `grpc` - Outbound call metadata and backend channel credentials

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod grpc;
pub mod state;
