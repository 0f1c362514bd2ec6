// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token request authentication.
//!
//! Collapses every verification failure into "not authenticated" for the
//! caller. The failure kind is logged: dependency outages at `error`,
//! credential problems at `warn`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{error, warn};

use super::claims::Identity;
use super::error::AuthError;
use super::verifier::TokenVerifier;

const BEARER_PREFIX: &str = "bearer ";

/// Authenticates requests against one identity provider.
pub struct Authenticator {
    verifier: TokenVerifier,
}

impl Authenticator {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticate a request, returning the caller's identity or `None`.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        self.try_authenticate(headers).await.ok()
    }

    /// Authenticate a request, keeping the failure kind.
    ///
    /// The error is for logging and internal decisions only; never send its
    /// details to the client.
    pub async fn try_authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let result = self.identify(headers).await;
        if let Err(e) = &result {
            if e.is_dependency_failure() {
                error!(error_code = e.error_code(), error = %e, "Identity provider unavailable during authentication");
            } else {
                warn!(error_code = e.error_code(), error = %e, "Request authentication failed");
            }
        }
        result
    }

    async fn identify(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify(token).await?;
        Identity::from_claims(claims)
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Header name lookup is case-insensitive (`HeaderMap`), and so is the
/// `Bearer` scheme.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let scheme = value
        .get(..BEARER_PREFIX.len())
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwks::JwksCache;
    use crate::auth::test_support::{rsa_entry, token_with, StaticKeySource, CLIENT_ID, ISSUER, KID};
    use crate::auth::validation::ClaimExpectations;
    use axum::http::HeaderValue;
    use serde_json::json;
    use std::sync::Arc;

    fn authenticator(source: &Arc<StaticKeySource>) -> Authenticator {
        let cache = Arc::new(JwksCache::new(source.clone()));
        Authenticator::new(TokenVerifier::new(
            cache,
            ClaimExpectations::new(ISSUER, CLIENT_ID),
        ))
    }

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_prefix_is_case_insensitive() {
        for value in ["Bearer abc", "bearer abc", "BEARER abc", "Bearer   abc  "] {
            assert_eq!(bearer_token(&headers("authorization", value)), Ok("abc"));
        }
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let mut map = HeaderMap::new();
        map.insert(
            axum::http::HeaderName::from_bytes(b"AUTHORIZATION").unwrap(),
            HeaderValue::from_static("Bearer xyz"),
        );
        assert_eq!(bearer_token(&map), Ok("xyz"));
    }

    #[test]
    fn rejects_missing_or_non_bearer_headers() {
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        );
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer ", "Bearerabc", "abc"] {
            assert_eq!(
                bearer_token(&headers("authorization", value)),
                Err(AuthError::InvalidAuthHeader),
                "{value}"
            );
        }
    }

    #[tokio::test]
    async fn authenticate_returns_identity_for_valid_token() {
        let source = Arc::new(StaticKeySource::new(vec![rsa_entry(KID)]));
        let auth = authenticator(&source);
        let token = token_with(|_| {});

        let identity = auth
            .authenticate(&headers("authorization", &format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(identity.subject, "00u1abcd");
        assert_eq!(identity.display_name, "Ada Lovelace");
        assert_eq!(identity.organization_name, "Analytical Engines");
        assert_eq!(identity.organization_id.as_deref(), Some("org_42"));
    }

    #[tokio::test]
    async fn authenticate_collapses_failures_to_none() {
        let source = Arc::new(StaticKeySource::new(vec![rsa_entry(KID)]));
        let auth = authenticator(&source);
        let expired = token_with(|c| {
            c.insert("exp".into(), json!(0));
        });

        assert!(auth.authenticate(&HeaderMap::new()).await.is_none());
        assert!(auth
            .authenticate(&headers("authorization", &format!("Bearer {expired}")))
            .await
            .is_none());
        assert_eq!(
            auth.try_authenticate(&headers("authorization", &format!("Bearer {expired}")))
                .await,
            Err(AuthError::TokenExpired)
        );
    }

    #[tokio::test]
    async fn token_without_subject_is_rejected() {
        let source = Arc::new(StaticKeySource::new(vec![rsa_entry(KID)]));
        let auth = authenticator(&source);
        let token = token_with(|c| {
            c.remove("sub");
        });

        assert_eq!(
            auth.try_authenticate(&headers("authorization", &format!("Bearer {token}")))
                .await,
            Err(AuthError::MalformedToken)
        );
    }
}
