// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims and the identity handlers consume.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::AuthError;

/// Organization name used when the token carries none.
pub const UNKNOWN_ORGANIZATION: &str = "Unknown Organization";

/// A token payload. Only ever constructed from a decoded token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A string claim; non-string values count as absent.
    pub fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// A NumericDate claim in whole epoch seconds.
    pub fn numeric_claim(&self, name: &str) -> Option<i64> {
        let value = self.0.get(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// First claim in `names` holding a non-empty string.
    fn first_non_empty(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.str_claim(name))
            .find(|value| !value.is_empty())
    }
}

/// Authenticated caller, built from verified claims.
///
/// This is the primary type downstream handlers use to scope data access.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Canonical user ID (`sub` claim)
    pub subject: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// `name`, else `email`, else `sub`
    pub display_name: String,

    /// `organization`, else `org`, else "Unknown Organization"
    pub organization_name: String,

    /// `organizationId`, else `org_id`
    pub organization_id: Option<String>,

    /// Every claim of the token, for fields not promoted above
    pub claims: Claims,
}

impl Identity {
    /// Create from verified claims.
    ///
    /// A token without a non-empty `sub` cannot identify anyone and is
    /// rejected as malformed.
    pub fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let subject = claims
            .first_non_empty(&["sub"])
            .ok_or(AuthError::MalformedToken)?
            .to_string();
        let email = claims.first_non_empty(&["email"]).map(str::to_string);
        let display_name = claims
            .first_non_empty(&["name", "email", "sub"])
            .unwrap_or(&subject)
            .to_string();
        let organization_name = claims
            .first_non_empty(&["organization", "org"])
            .unwrap_or(UNKNOWN_ORGANIZATION)
            .to_string();
        let organization_id = claims
            .first_non_empty(&["organizationId", "org_id"])
            .map(str::to_string);

        Ok(Self {
            subject,
            email,
            display_name,
            organization_name,
            organization_id,
            claims,
        })
    }
}
