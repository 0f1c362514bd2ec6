// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. `exp` present and not in the past
//! 2. `iat`, when present, no more than [`ISSUED_AT_LEEWAY_SECS`] ahead
//! 3. `iss` equal to the expected issuer, byte for byte
//! 4. `cid` or, failing that, `aud` equal to the expected client id

use serde_json::Value;

use super::claims::Claims;
use super::error::AuthError;

/// Clock skew tolerance for `iat` (5 minutes).
pub const ISSUED_AT_LEEWAY_SECS: i64 = 300;

/// What a token must be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimExpectations {
    pub issuer: String,
    pub client_id: String,
}

impl ClaimExpectations {
    pub fn new(issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            client_id: client_id.into(),
        }
    }
}

/// Validate `claims` as of `now` (epoch seconds).
pub fn validate_claims(
    claims: &Claims,
    expected: &ClaimExpectations,
    now: i64,
) -> Result<(), AuthError> {
    match claims.numeric_claim("exp") {
        Some(exp) if exp >= now => {}
        _ => return Err(AuthError::TokenExpired),
    }

    if let Some(iat) = claims.numeric_claim("iat") {
        if iat > now.saturating_add(ISSUED_AT_LEEWAY_SECS) {
            return Err(AuthError::TokenNotYetValid);
        }
    }

    if claims.str_claim("iss") != Some(expected.issuer.as_str()) {
        return Err(AuthError::InvalidIssuer);
    }

    let client_id = expected.client_id.as_str();
    let cid_matches = claims.str_claim("cid") == Some(client_id);
    if !cid_matches && !audience_contains(claims.get("aud"), client_id) {
        return Err(AuthError::InvalidAudience);
    }

    Ok(())
}

/// `aud` may be a single string or an array of strings.
fn audience_contains(aud: Option<&Value>, client_id: &str) -> bool {
    match aud {
        Some(Value::String(aud)) => aud == client_id,
        Some(Value::Array(values)) => values.iter().any(|v| v.as_str() == Some(client_id)),
        _ => false,
    }
}
