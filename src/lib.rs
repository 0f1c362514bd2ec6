// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! OIDC Gatekeeper - bearer-token verification for OIDC-protected APIs
//!
//! Verifies RS256 access tokens issued by an Okta authorization server
//! against its published signing keys, and hands the caller's identity to
//! request handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token parsing, JWKS cache, key building, verification
//! - `config` - Environment configuration
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod state;
pub mod telemetry;
