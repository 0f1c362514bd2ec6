// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{
    AuthError, Authenticator, ClaimExpectations, HttpKeySource, JwksCache, TokenVerifier,
};
use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    /// Wire the authenticator to the configured identity provider.
    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        let source = HttpKeySource::for_issuer(&settings.issuer, settings.jwks_fetch_timeout)?;
        let keys = JwksCache::new(Arc::new(source)).with_cache_ttl(settings.jwks_cache_ttl);
        let expected = ClaimExpectations::new(&settings.issuer, &settings.client_id);

        Ok(Self::new(Authenticator::new(TokenVerifier::new(
            Arc::new(keys),
            expected,
        ))))
    }

    pub fn jwks(&self) -> &Arc<JwksCache> {
        self.authenticator.verifier().keys()
    }
}

#[cfg(test)]
pub(crate) fn test_state(
    source: Arc<crate::auth::test_support::StaticKeySource>,
) -> AppState {
    use crate::auth::test_support::{CLIENT_ID, ISSUER};

    let keys = Arc::new(JwksCache::new(source));
    AppState::new(Authenticator::new(TokenVerifier::new(
        keys,
        ClaimExpectations::new(ISSUER, CLIENT_ID),
    )))
}
