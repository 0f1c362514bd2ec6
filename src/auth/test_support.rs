// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for auth tests: a real RSA key pair, token minting and an
//! in-memory key source that counts fetches.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use sha2::Sha256;

use super::error::AuthError;
use super::jwks::{JwkEntry, KeySource};

pub(crate) const ISSUER: &str = "https://example.okta.com/oauth2/default";
pub(crate) const CLIENT_ID: &str = "client123";
pub(crate) const KID: &str = "test-key-1";

/// A 2048-bit RSA key pair generated once per test binary.
pub(crate) struct TestKey {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl TestKey {
    pub(crate) fn shared() -> &'static TestKey {
        static KEY: OnceLock<TestKey> = OnceLock::new();
        KEY.get_or_init(TestKey::generate)
    }

    /// A second, unrelated key pair.
    pub(crate) fn other() -> &'static TestKey {
        static KEY: OnceLock<TestKey> = OnceLock::new();
        KEY.get_or_init(TestKey::generate)
    }

    fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("RSA key generation failed");
        let public = RsaPublicKey::from(&private);
        Self { private, public }
    }

    pub(crate) fn modulus(&self) -> Vec<u8> {
        self.public.n().to_bytes_be()
    }

    pub(crate) fn exponent(&self) -> Vec<u8> {
        self.public.e().to_bytes_be()
    }

    pub(crate) fn pkcs1_public_der(&self) -> Vec<u8> {
        self.public.to_pkcs1_der().unwrap().as_bytes().to_vec()
    }

    pub(crate) fn spki_public_der(&self) -> Vec<u8> {
        self.public.to_public_key_der().unwrap().as_bytes().to_vec()
    }

    pub(crate) fn private_pem(&self) -> String {
        self.private
            .to_pkcs1_pem(LineEnding::LF)
            .unwrap()
            .as_str()
            .to_owned()
    }

    pub(crate) fn sign(&self, message: &[u8]) -> Vec<u8> {
        SigningKey::<Sha256>::new(self.private.clone())
            .sign(message)
            .to_vec()
    }

    pub(crate) fn jwk(&self, kid: &str) -> JwkEntry {
        JwkEntry {
            kid: kid.to_string(),
            kty: "RSA".to_string(),
            n: Some(Base64UrlUnpadded::encode_string(&self.modulus())),
            e: Some(Base64UrlUnpadded::encode_string(&self.exponent())),
        }
    }

    /// Sign `header.payload` built from arbitrary JSON.
    pub(crate) fn mint(&self, header: &Value, claims: &Value) -> String {
        let signing_input = format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(header.to_string().as_bytes()),
            Base64UrlUnpadded::encode_string(claims.to_string().as_bytes())
        );
        let signature = self.sign(signing_input.as_bytes());
        format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        )
    }
}

/// JWKS entry for the shared key under `kid`.
pub(crate) fn rsa_entry(kid: &str) -> JwkEntry {
    TestKey::shared().jwk(kid)
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn rs256_header() -> Value {
    json!({"alg": "RS256", "kid": KID, "typ": "JWT"})
}

/// Claims that pass validation against `ISSUER` / `CLIENT_ID`.
pub(crate) fn valid_claims() -> Value {
    let now = now();
    json!({
        "sub": "00u1abcd",
        "iss": ISSUER,
        "cid": CLIENT_ID,
        "iat": now,
        "exp": now + 3600,
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "organization": "Analytical Engines",
        "organizationId": "org_42",
    })
}

/// Mint a token with the shared key after `edit` adjusts the valid claims.
pub(crate) fn token_with(edit: impl FnOnce(&mut serde_json::Map<String, Value>)) -> String {
    let mut claims = valid_claims();
    if let Value::Object(map) = &mut claims {
        edit(map);
    }
    TestKey::shared().mint(&rs256_header(), &claims)
}

/// In-memory key source with a fetch counter.
pub(crate) struct StaticKeySource {
    keys: Mutex<Vec<JwkEntry>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
    delay: Duration,
}

impl StaticKeySource {
    pub(crate) fn new(keys: Vec<JwkEntry>) -> Self {
        Self {
            keys: Mutex::new(keys),
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_keys(&self, keys: Vec<JwkEntry>) {
        *self.keys.lock().unwrap() = keys;
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch_keys(&self) -> Result<Vec<JwkEntry>, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::KeySourceUnavailable("static source offline".to_string()));
        }
        Ok(self.keys.lock().unwrap().clone())
    }

    fn describe(&self) -> &str {
        "static"
    }
}
