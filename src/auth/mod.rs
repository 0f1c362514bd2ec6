// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication against an OIDC identity provider (Okta).
//!
//! ## Auth Flow
//!
//! 1. Client authenticates with the identity provider
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Server:
//!    - Parses the compact token and requires `alg: RS256` and a `kid`
//!    - Looks the `kid` up in the cached JWKS (`{issuer}/v1/keys`)
//!    - Builds the RSA public key from `n`/`e` and verifies the signature
//!    - Validates `exp`, `iat`, `iss` and `cid`/`aud`
//!    - Maps claims to an [`Identity`]
//!
//! ## Security
//!
//! - Every failure is reported to the client as the same 401
//! - Only RS256 is accepted; the header never selects the algorithm
//! - Signatures are checked before any claim is trusted
//! - JWKS is cached with a TTL and refreshed by at most one fetch at a time

pub mod authenticator;
pub mod claims;
pub mod der;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod token;
pub mod validation;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use authenticator::Authenticator;
pub use claims::{Claims, Identity};
pub use der::PublicKeyMaterial;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use jwks::{HttpKeySource, JwkEntry, JwksCache, KeySource};
pub use middleware::require_auth;
pub use token::CompactToken;
pub use validation::ClaimExpectations;
pub use verifier::TokenVerifier;
