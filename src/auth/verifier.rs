// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 token verification.
//!
//! Order matters: structural and algorithm checks run before any key
//! lookup (so malformed tokens never cost a network call), and the
//! signature is checked before claims (so unsigned tokens cannot probe
//! claim validation).

use std::sync::Arc;

use ring::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA256};
use tracing::debug;

use super::claims::Claims;
use super::der::PublicKeyMaterial;
use super::error::AuthError;
use super::jwks::JwksCache;
use super::token::CompactToken;
use super::validation::{validate_claims, ClaimExpectations};

/// The only accepted signing algorithm.
pub const SUPPORTED_ALGORITHM: &str = "RS256";

/// Verifies tokens against one identity provider.
pub struct TokenVerifier {
    keys: Arc<JwksCache>,
    expected: ClaimExpectations,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksCache>, expected: ClaimExpectations) -> Self {
        Self { keys, expected }
    }

    pub fn keys(&self) -> &Arc<JwksCache> {
        &self.keys
    }

    pub fn expectations(&self) -> &ClaimExpectations {
        &self.expected
    }

    /// Verify a compact token and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, chrono::Utc::now().timestamp()).await
    }

    /// Verify as of `now` (epoch seconds).
    pub async fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let parsed = CompactToken::parse(token)?;

        let header = parsed.header();
        match header.alg.as_deref() {
            Some(SUPPORTED_ALGORITHM) => {}
            other => {
                return Err(AuthError::UnsupportedAlgorithm(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }

        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(AuthError::MissingKeyId)?;

        let jwk = self.keys.get_key(kid).await?;
        let material = PublicKeyMaterial::from_jwk(&jwk)?;

        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, material.rsa_public_key_der())
            .verify(parsed.signing_input(), parsed.signature())
            .map_err(|_| AuthError::InvalidSignature)?;
        debug!(kid, "Token signature verified");

        let claims = Claims::new(parsed.into_payload());
        validate_claims(&claims, &self.expected, now)?;

        Ok(claims)
    }
}
