// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Compact JWS token parsing.
//!
//! Parsing only checks shape: three base64url segments, the first two of
//! which are JSON objects. It never rejects a token based on claim content
//! and never touches the network.

use base64ct::{Base64Url, Encoding};
use serde_json::{Map, Value};

use super::error::AuthError;

/// The fields of a token header this crate acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Signing algorithm (`alg`)
    pub alg: Option<String>,
    /// Key identifier (`kid`)
    pub kid: Option<String>,
}

/// A parsed compact-serialization token.
#[derive(Debug, Clone)]
pub struct CompactToken<'a> {
    raw: &'a str,
    header_len: usize,
    payload_len: usize,
    header: Header,
    payload: Map<String, Value>,
    signature: Vec<u8>,
}

impl<'a> CompactToken<'a> {
    /// Split and decode a `header.payload.signature` token.
    pub fn parse(raw: &'a str) -> Result<Self, AuthError> {
        let mut parts = raw.split('.');
        let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedToken);
        };

        if header_segment.is_empty() || payload_segment.is_empty() || signature_segment.is_empty()
        {
            return Err(AuthError::MalformedToken);
        }

        let header_object = decode_json_object(header_segment)?;
        let payload = decode_json_object(payload_segment)?;
        let signature = decode_base64url(signature_segment).ok_or(AuthError::MalformedToken)?;

        Ok(Self {
            raw,
            header_len: header_segment.len(),
            payload_len: payload_segment.len(),
            header: Header {
                alg: string_field(&header_object, "alg"),
                kid: string_field(&header_object, "kid"),
            },
            payload,
            signature,
        })
    }

    /// Base64url header segment as received.
    pub fn header_segment(&self) -> &'a str {
        let raw: &'a str = self.raw;
        &raw[..self.header_len]
    }

    /// Base64url payload segment as received.
    pub fn payload_segment(&self) -> &'a str {
        let raw: &'a str = self.raw;
        let start = self.header_len + 1;
        &raw[start..start + self.payload_len]
    }

    /// The exact bytes the signature covers: `header.payload` as received.
    pub fn signing_input(&self) -> &'a [u8] {
        let raw: &'a str = self.raw;
        raw[..self.header_len + 1 + self.payload_len].as_bytes()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Consume the token, keeping only the decoded payload.
    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }
}

/// Decode base64url, tolerating both padded and unpadded input.
pub(crate) fn decode_base64url(segment: &str) -> Option<Vec<u8>> {
    let missing = (4 - segment.len() % 4) % 4;
    if missing == 0 {
        return Base64Url::decode_vec(segment).ok();
    }
    let mut padded = String::with_capacity(segment.len() + missing);
    padded.push_str(segment);
    padded.extend(std::iter::repeat('=').take(missing));
    Base64Url::decode_vec(&padded).ok()
}

fn decode_json_object(segment: &str) -> Result<Map<String, Value>, AuthError> {
    let bytes = decode_base64url(segment).ok_or(AuthError::MalformedToken)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(AuthError::MalformedToken),
    }
}

fn string_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    object.get(name).and_then(Value::as_str).map(str::to_string)
}
