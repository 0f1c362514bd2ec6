// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant is terminal for the verification attempt that produced it.
//! The specific kind is only ever logged; clients receive the same
//! `401 Unauthorized` response whatever went wrong.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,

    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    /// Token is structurally malformed
    #[error("Token is malformed")]
    MalformedToken,

    /// Token header names an algorithm other than RS256
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Token header has no `kid`
    #[error("Token header has no key id")]
    MissingKeyId,

    /// JWKS entry is not an RSA key
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// JWKS entry is missing or has unusable modulus/exponent
    #[error("Malformed signing key: {0}")]
    MalformedKey(String),

    /// The identity provider's key endpoint could not be used
    #[error("Signing key source unavailable: {0}")]
    KeySourceUnavailable(String),

    /// No key in the current key set matches the token's `kid`
    #[error("No signing key found for kid {0:?}")]
    KeyNotFound(String),

    /// Token signature does not verify
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is issued too far in the future
    #[error("Token is not yet valid")]
    TokenNotYetValid,

    /// Token issuer is invalid
    #[error("Token issuer is invalid")]
    InvalidIssuer,

    /// Token audience / client id is invalid
    #[error("Token audience is invalid")]
    InvalidAudience,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl AuthError {
    /// Stable error kind, used as a structured log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::MissingKeyId => "missing_key_id",
            AuthError::UnsupportedKeyType(_) => "unsupported_key_type",
            AuthError::MalformedKey(_) => "malformed_key",
            AuthError::KeySourceUnavailable(_) => "key_source_unavailable",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
        }
    }

    /// True when the failure is an identity-provider outage rather than a
    /// problem with the presented credentials.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, AuthError::KeySourceUnavailable(_))
    }

    /// HTTP status presented to the client. Always 401 so that responses
    /// cannot be used as a signature or claim oracle.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status_code(),
            Json(AuthErrorBody {
                error: "unauthorized",
            }),
        )
            .into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}
