// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Caching rules
//!
//! - A snapshot is fresh while `now - fetched_at < ttl`.
//! - A stale or missing snapshot is refetched before the lookup.
//! - A `kid` miss on a fresh snapshot fails without touching the network.
//! - A failed fetch keeps the previous snapshot but fails the request.
//! - At most one fetch is in flight per cache; callers queued behind it
//!   take its outcome instead of fetching again.
//!
//! Snapshots are immutable and swapped behind an `Arc`, so a reader holds
//! either the old key set or the new one, never a mix.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::AuthError;

/// Default JWKS cache TTL (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default timeout for the key endpoint request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest key set document accepted from the identity provider.
const MAX_JWKS_SIZE: usize = 1024 * 1024;

/// One entry of a JWKS document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JwkEntry {
    #[serde(default)]
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the provider's current key set.
    ///
    /// Any failure is reported as `AuthError::KeySourceUnavailable`.
    async fn fetch_keys(&self) -> Result<Vec<JwkEntry>, AuthError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> &str;
}

/// Fetches `{issuer}/v1/keys` over HTTPS.
#[derive(Clone)]
pub struct HttpKeySource {
    keys_url: String,
    client: reqwest::Client,
}

impl HttpKeySource {
    /// Create a key source for the given issuer.
    ///
    /// # Arguments
    /// - `issuer`: e.g. `https://example.okta.com/oauth2/default`
    /// - `timeout`: applied to the whole request, connect included
    pub fn for_issuer(issuer: &str, timeout: Duration) -> Result<Self, AuthError> {
        let keys_url = format!("{}/v1/keys", issuer.trim_end_matches('/'));
        Self::new(keys_url, timeout)
    }

    /// Create a key source for an explicit JWKS URL.
    pub fn new(keys_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AuthError::KeySourceUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            keys_url: keys_url.into(),
            client,
        })
    }

    pub fn keys_url(&self) -> &str {
        &self.keys_url
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_keys(&self) -> Result<Vec<JwkEntry>, AuthError> {
        let response = self
            .client
            .get(&self.keys_url)
            .send()
            .await
            .map_err(|e| AuthError::KeySourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySourceUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::KeySourceUnavailable(e.to_string()))?;

        if body.len() > MAX_JWKS_SIZE {
            return Err(AuthError::KeySourceUnavailable(format!(
                "JWKS document too large ({} bytes)",
                body.len()
            )));
        }

        let document: JwksDocument = serde_json::from_slice(&body)
            .map_err(|e| AuthError::KeySourceUnavailable(format!("invalid JWKS document: {e}")))?;

        Ok(document.keys)
    }

    fn describe(&self) -> &str {
        &self.keys_url
    }
}

/// An immutable key set as of one fetch.
#[derive(Debug)]
struct JwksSnapshot {
    keys: HashMap<String, JwkEntry>,
    fetched_at: Instant,
}

impl JwksSnapshot {
    fn new(entries: Vec<JwkEntry>) -> Self {
        let mut keys = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.kid.is_empty() {
                debug!(kty = %entry.kty, "Ignoring JWKS entry without kid");
                continue;
            }
            if keys.contains_key(&entry.kid) {
                warn!(kid = %entry.kid, "Duplicate kid in JWKS, keeping first entry");
                continue;
            }
            keys.insert(entry.kid.clone(), entry);
        }

        Self {
            keys,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Outcome of the most recent fetch, handed to callers that queued behind it.
#[derive(Default)]
struct RefreshSlot {
    last_error: Option<AuthError>,
}

/// JWKS cache with TTL and coalesced refresh.
///
/// Construct one per identity provider and share it through an `Arc`.
pub struct JwksCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    snapshot: RwLock<Option<Arc<JwksSnapshot>>>,
    refresh: Mutex<RefreshSlot>,
    /// Number of completed fetches, successful or not.
    generation: AtomicU64,
}

impl JwksCache {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            ttl: DEFAULT_CACHE_TTL,
            snapshot: RwLock::new(None),
            refresh: Mutex::new(RefreshSlot::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a key by `kid`, refreshing the key set if it is stale.
    pub async fn get_key(&self, kid: &str) -> Result<JwkEntry, AuthError> {
        let observed = self.generation.load(Ordering::Acquire);

        let snapshot = match self.current().await {
            Some(snapshot) if snapshot.is_fresh(self.ttl) => snapshot,
            _ => {
                debug!(kid, "JWKS cache stale or empty, refreshing");
                self.refresh_after(observed).await?
            }
        };

        snapshot
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_string()))
    }

    /// Force a fetch of the key set.
    ///
    /// Joins a fetch that is already in flight rather than starting another.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let observed = self.generation.load(Ordering::Acquire);
        self.refresh_after(observed).await.map(|_| ())
    }

    /// Check if a fresh key set is cached.
    pub async fn is_cached(&self) -> bool {
        self.current()
            .await
            .is_some_and(|snapshot| snapshot.is_fresh(self.ttl))
    }

    async fn current(&self) -> Option<Arc<JwksSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Fetch unless a fetch completed since `observed` was read, in which
    /// case that fetch's outcome is reused.
    async fn refresh_after(&self, observed: u64) -> Result<Arc<JwksSnapshot>, AuthError> {
        let mut slot = self.refresh.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(error) = &slot.last_error {
                return Err(error.clone());
            }
            if let Some(snapshot) = self.current().await {
                return Ok(snapshot);
            }
        }

        let outcome = self.fetch_snapshot().await;
        slot.last_error = outcome.as_ref().err().cloned();
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn fetch_snapshot(&self) -> Result<Arc<JwksSnapshot>, AuthError> {
        info!(source = %self.source.describe(), "Fetching JWKS");

        let entries = self.source.fetch_keys().await.inspect_err(|e| {
            warn!(source = %self.source.describe(), error = %e, "JWKS fetch failed, keeping previous key set");
        })?;

        let snapshot = Arc::new(JwksSnapshot::new(entries));
        info!(
            source = %self.source.describe(),
            key_count = snapshot.keys.len(),
            "Successfully fetched JWKS"
        );

        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }
}
