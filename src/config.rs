// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `OKTA_ISSUER` | Expected `iss` claim; also locates the JWKS | Derived from `OKTA_DOMAIN` |
//! | `OKTA_DOMAIN` | Okta org domain, used as `https://{domain}/oauth2/default` | Required if no issuer |
//! | `OKTA_CLIENT_ID` | Expected `cid` (or `aud`) claim | Required |
//! | `JWKS_CACHE_TTL_SECS` | Lifetime of a fetched key set | `3600` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Timeout for one JWKS request | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Values are trimmed and an empty value counts as unset.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::jwks::{DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT};

/// Environment variable name for the expected token issuer.
///
/// Takes precedence over [`OKTA_DOMAIN_ENV`].
pub const OKTA_ISSUER_ENV: &str = "OKTA_ISSUER";

/// Environment variable name for the Okta org domain.
pub const OKTA_DOMAIN_ENV: &str = "OKTA_DOMAIN";

/// Environment variable name for the OAuth client id tokens must be bound to.
pub const OKTA_CLIENT_ID_ENV: &str = "OKTA_CLIENT_ID";

/// Environment variable name for the JWKS cache TTL in seconds.
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";

/// Environment variable name for the JWKS fetch timeout in seconds.
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Authorization server path appended to `OKTA_DOMAIN`.
const DEFAULT_AUTHORIZATION_SERVER_PATH: &str = "/oauth2/default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid issuer {0:?}: must be an https URL")]
    InvalidIssuer(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// One JSON object per line for log collectors.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub issuer: String,
    pub client_id: String,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let issuer = match (get(OKTA_ISSUER_ENV), get(OKTA_DOMAIN_ENV)) {
            (Some(issuer), _) => issuer,
            (None, Some(domain)) => issuer_from_domain(&domain),
            (None, None) => return Err(ConfigError::MissingConfig(OKTA_ISSUER_ENV)),
        };
        validate_issuer(&issuer)?;

        let client_id = get(OKTA_CLIENT_ID_ENV).ok_or(ConfigError::MissingConfig(OKTA_CLIENT_ID_ENV))?;

        let jwks_cache_ttl = match get(JWKS_CACHE_TTL_ENV) {
            Some(value) => Duration::from_secs(parse_secs(JWKS_CACHE_TTL_ENV, value)?),
            None => DEFAULT_CACHE_TTL,
        };
        let jwks_fetch_timeout = match get(JWKS_FETCH_TIMEOUT_ENV) {
            Some(value) => Duration::from_secs(parse_secs(JWKS_FETCH_TIMEOUT_ENV, value)?),
            None => DEFAULT_FETCH_TIMEOUT,
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::parse(&value).ok_or(ConfigError::InvalidValue {
                name: LOG_FORMAT_ENV,
                value,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            issuer,
            client_id,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            host,
            port,
            log_format,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn issuer_from_domain(domain: &str) -> String {
    let host = domain
        .trim_start_matches("https://")
        .trim_end_matches('/');
    format!("https://{host}{DEFAULT_AUTHORIZATION_SERVER_PATH}")
}

/// Plain `http` is only allowed for a local identity provider.
fn validate_issuer(issuer: &str) -> Result<(), ConfigError> {
    let url = Url::parse(issuer).map_err(|_| ConfigError::InvalidIssuer(issuer.to_string()))?;
    let local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));
    match url.scheme() {
        "https" => Ok(()),
        "http" if local => Ok(()),
        _ => Err(ConfigError::InvalidIssuer(issuer.to_string())),
    }
}

fn parse_secs(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let settings = load(&[
            (OKTA_ISSUER_ENV, "https://example.okta.com/oauth2/default"),
            (OKTA_CLIENT_ID_ENV, "client123"),
        ])
        .unwrap();

        assert_eq!(settings.issuer, "https://example.okta.com/oauth2/default");
        assert_eq!(settings.client_id, "client123");
        assert_eq!(settings.jwks_cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.jwks_fetch_timeout, Duration::from_secs(10));
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn issuer_is_derived_from_domain() {
        for domain in ["dev-123.okta.com", "https://dev-123.okta.com/", " dev-123.okta.com "] {
            let settings = load(&[(OKTA_DOMAIN_ENV, domain), (OKTA_CLIENT_ID_ENV, "c")]).unwrap();
            assert_eq!(settings.issuer, "https://dev-123.okta.com/oauth2/default");
        }
    }

    #[test]
    fn explicit_issuer_wins_over_domain() {
        let settings = load(&[
            (OKTA_ISSUER_ENV, "https://login.example.com/oauth2/aus123"),
            (OKTA_DOMAIN_ENV, "dev-123.okta.com"),
            (OKTA_CLIENT_ID_ENV, "c"),
        ])
        .unwrap();
        assert_eq!(settings.issuer, "https://login.example.com/oauth2/aus123");
    }

    #[test]
    fn missing_required_values_are_reported() {
        assert_eq!(
            load(&[(OKTA_CLIENT_ID_ENV, "c")]),
            Err(ConfigError::MissingConfig(OKTA_ISSUER_ENV))
        );
        assert_eq!(
            load(&[(OKTA_DOMAIN_ENV, "dev-123.okta.com"), (OKTA_CLIENT_ID_ENV, "  ")]),
            Err(ConfigError::MissingConfig(OKTA_CLIENT_ID_ENV))
        );
    }

    #[test]
    fn issuer_must_be_https_unless_local() {
        for issuer in ["http://example.okta.com/oauth2/default", "example.okta.com", "ftp://x"] {
            assert!(matches!(
                load(&[(OKTA_ISSUER_ENV, issuer), (OKTA_CLIENT_ID_ENV, "c")]),
                Err(ConfigError::InvalidIssuer(_))
            ));
        }
        for issuer in ["http://localhost:8081/oauth2/default", "http://127.0.0.1:9000"] {
            assert!(load(&[(OKTA_ISSUER_ENV, issuer), (OKTA_CLIENT_ID_ENV, "c")]).is_ok());
        }
    }

    #[test]
    fn numeric_values_are_validated() {
        let base = [(OKTA_DOMAIN_ENV, "dev.okta.com"), (OKTA_CLIENT_ID_ENV, "c")];

        let settings = load(&[base[0], base[1], (JWKS_CACHE_TTL_ENV, "60"), (PORT_ENV, "3000")]).unwrap();
        assert_eq!(settings.jwks_cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.port, 3000);

        assert!(matches!(
            load(&[base[0], base[1], (JWKS_CACHE_TTL_ENV, "0")]),
            Err(ConfigError::InvalidValue { name: JWKS_CACHE_TTL_ENV, .. })
        ));
        assert!(matches!(
            load(&[base[0], base[1], (JWKS_FETCH_TIMEOUT_ENV, "soon")]),
            Err(ConfigError::InvalidValue { name: JWKS_FETCH_TIMEOUT_ENV, .. })
        ));
        assert!(matches!(
            load(&[base[0], base[1], (PORT_ENV, "70000")]),
            Err(ConfigError::InvalidValue { name: PORT_ENV, .. })
        ));
    }

    #[test]
    fn log_format_is_parsed() {
        let base = [(OKTA_DOMAIN_ENV, "dev.okta.com"), (OKTA_CLIENT_ID_ENV, "c")];
        let settings = load(&[base[0], base[1], (LOG_FORMAT_ENV, "JSON")]).unwrap();
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(matches!(
            load(&[base[0], base[1], (LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::InvalidValue { name: LOG_FORMAT_ENV, .. })
        ));
    }
}
