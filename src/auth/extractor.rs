// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity.organization_id scopes the data this caller may see
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Identity};
use crate::state::AppState;

/// Extractor for the authenticated caller.
///
/// Reuses the identity placed in request extensions by
/// [`require_auth`](super::middleware::require_auth) when present, and
/// verifies the bearer token itself otherwise.
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        let identity = state.authenticator.try_authenticate(&parts.headers).await?;
        Ok(Auth(identity))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` instead of rejecting when the caller is not authenticated.
pub struct OptionalAuth(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(identity)) => Ok(OptionalAuth(Some(identity))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
