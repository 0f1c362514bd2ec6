// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSA public key construction from JWK components.
//!
//! JWKS documents publish RSA keys as a base64url modulus (`n`) and
//! exponent (`e`). Signature primitives want DER, so this module builds:
//!
//! ```text
//! RSAPublicKey ::= SEQUENCE {
//!     modulus           INTEGER,
//!     publicExponent    INTEGER }
//!
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         SEQUENCE { OID rsaEncryption, NULL },
//!     subjectPublicKey  BIT STRING (RSAPublicKey) }
//! ```
//!
//! Everything here is pure: no I/O and no shared state.

use pem::{EncodeConfig, LineEnding, Pem};

use super::error::AuthError;
use super::jwks::JwkEntry;
use super::token::decode_base64url;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_NULL: u8 = 0x05;
const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

/// rsaEncryption, 1.2.840.113549.1.1.1
const RSA_ENCRYPTION_OID: [u8; 9] = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01];

const PEM_TAG: &str = "PUBLIC KEY";

/// DER encodings of one RSA public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    rsa_public_key: Vec<u8>,
    subject_public_key_info: Vec<u8>,
}

impl PublicKeyMaterial {
    /// Build key material from a JWKS entry.
    ///
    /// Fails with `UnsupportedKeyType` unless `kty` is `RSA`, and with
    /// `MalformedKey` when `n` or `e` is missing, empty, or not base64url.
    pub fn from_jwk(jwk: &JwkEntry) -> Result<Self, AuthError> {
        if jwk.kty != "RSA" {
            return Err(AuthError::UnsupportedKeyType(jwk.kty.clone()));
        }

        let n = decode_component(jwk.n.as_deref(), "n")?;
        let e = decode_component(jwk.e.as_deref(), "e")?;
        Self::from_components(&n, &e)
    }

    /// Build key material from raw big-endian unsigned modulus and exponent.
    pub fn from_components(modulus: &[u8], exponent: &[u8]) -> Result<Self, AuthError> {
        if is_zero(modulus) {
            return Err(AuthError::MalformedKey("modulus is empty".to_string()));
        }
        if is_zero(exponent) {
            return Err(AuthError::MalformedKey("exponent is empty".to_string()));
        }

        let mut body = encode_integer(modulus);
        body.extend(encode_integer(exponent));
        let rsa_public_key = encode_tlv(TAG_SEQUENCE, &body);

        let subject_public_key_info = wrap_subject_public_key_info(&rsa_public_key);

        Ok(Self {
            rsa_public_key,
            subject_public_key_info,
        })
    }

    /// PKCS#1 `RSAPublicKey` DER, the input `ring` expects.
    pub fn rsa_public_key_der(&self) -> &[u8] {
        &self.rsa_public_key
    }

    /// X.509 `SubjectPublicKeyInfo` DER.
    pub fn spki_der(&self) -> &[u8] {
        &self.subject_public_key_info
    }

    /// `-----BEGIN PUBLIC KEY-----` PEM with 64-character lines.
    pub fn to_pem(&self) -> String {
        let pem = Pem::new(PEM_TAG, self.subject_public_key_info.clone());
        pem::encode_config(&pem, EncodeConfig::new().set_line_ending(LineEnding::LF))
    }
}

fn decode_component(value: Option<&str>, name: &str) -> Result<Vec<u8>, AuthError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::MalformedKey(format!("missing `{name}`")))?;
    decode_base64url(value)
        .ok_or_else(|| AuthError::MalformedKey(format!("`{name}` is not valid base64url")))
}

fn is_zero(value: &[u8]) -> bool {
    value.iter().all(|b| *b == 0)
}

fn wrap_subject_public_key_info(rsa_public_key: &[u8]) -> Vec<u8> {
    let mut algorithm = encode_tlv(TAG_OBJECT_IDENTIFIER, &RSA_ENCRYPTION_OID);
    algorithm.extend(encode_tlv(TAG_NULL, &[]));
    let algorithm = encode_tlv(TAG_SEQUENCE, &algorithm);

    // Leading octet of a BIT STRING is the number of unused bits.
    let mut bits = Vec::with_capacity(rsa_public_key.len() + 1);
    bits.push(0x00);
    bits.extend_from_slice(rsa_public_key);
    let subject_public_key = encode_tlv(TAG_BIT_STRING, &bits);

    let mut body = algorithm;
    body.extend(subject_public_key);
    encode_tlv(TAG_SEQUENCE, &body)
}

/// DER INTEGER for an unsigned big-endian value.
///
/// Redundant leading zero octets are dropped and a single `0x00` is
/// prepended when the high bit is set, so the value stays positive.
pub(crate) fn encode_integer(unsigned: &[u8]) -> Vec<u8> {
    let first_significant = unsigned
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(unsigned.len().saturating_sub(1));
    let magnitude = &unsigned[first_significant..];

    let mut content = Vec::with_capacity(magnitude.len() + 1);
    if magnitude.is_empty() || magnitude[0] & 0x80 != 0 {
        content.push(0x00);
    }
    content.extend_from_slice(magnitude);
    encode_tlv(TAG_INTEGER, &content)
}

/// DER length octets.
pub(crate) fn encode_length(len: usize) -> Vec<u8> {
    if len <= 0x7F {
        return vec![len as u8];
    }

    let bytes = len.to_be_bytes();
    let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    let significant = &bytes[first_significant..];

    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let length = encode_length(content.len());
    let mut out = Vec::with_capacity(1 + length.len() + content.len());
    out.push(tag);
    out.extend(length);
    out.extend_from_slice(content);
    out
}
