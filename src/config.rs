// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! All configuration is read from the environment exactly once at startup
//! into an immutable [`Config`] that is injected into request handling.
//! Nothing in the protocol logic reads the environment ad hoc.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SERVER_SIGNING_PASSWORD` | HMAC secret binding state to challenge bytes | Unset: sign-in requests fail with 500 |
//! | `SERVER_ENCRYPTION_PASSWORD` | Secret sealing the state envelope | Unset: sign-in requests fail with 500 |
//! | `SIGNIN_DOMAIN` | Domain bound into every challenge | `example.com` |
//! | `SIGNIN_CHAIN_ID` | Chain bound into every challenge | `devnet` |
//! | `SIGNIN_STATEMENT` | Statement shown in the wallet prompt | `Please sign in to connect your account!` |
//! | `SIGNIN_URI` | URI bound into every challenge | `https://example.com/login` |
//! | `APP_LABEL` | Label returned by the metadata endpoint | `Some label` |
//! | `APP_ICON` | Icon URL returned by the metadata endpoint | Solana Pay gradient |
//! | `PUSHER_APP_ID` | Pusher application id | Unset: relay disabled |
//! | `PUSHER_KEY` | Pusher key | Unset: relay disabled |
//! | `PUSHER_SECRET` | Pusher secret | Unset: relay disabled |
//! | `PUSHER_CLUSTER` | Pusher cluster (e.g. `eu`) | Unset: relay disabled |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use crate::protocol::error::SignInError;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SIGNING_PASSWORD_ENV: &str = "SERVER_SIGNING_PASSWORD";
pub const ENCRYPTION_PASSWORD_ENV: &str = "SERVER_ENCRYPTION_PASSWORD";
pub const DOMAIN_ENV: &str = "SIGNIN_DOMAIN";
pub const CHAIN_ID_ENV: &str = "SIGNIN_CHAIN_ID";
pub const STATEMENT_ENV: &str = "SIGNIN_STATEMENT";
pub const URI_ENV: &str = "SIGNIN_URI";
pub const LABEL_ENV: &str = "APP_LABEL";
pub const ICON_ENV: &str = "APP_ICON";
pub const PUSHER_APP_ID_ENV: &str = "PUSHER_APP_ID";
pub const PUSHER_KEY_ENV: &str = "PUSHER_KEY";
pub const PUSHER_SECRET_ENV: &str = "PUSHER_SECRET";
pub const PUSHER_CLUSTER_ENV: &str = "PUSHER_CLUSTER";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DOMAIN: &str = "example.com";
const DEFAULT_CHAIN_ID: &str = "devnet";
const DEFAULT_STATEMENT: &str = "Please sign in to connect your account!";
const DEFAULT_URI: &str = "https://example.com/login";
const DEFAULT_LABEL: &str = "Some label";
const DEFAULT_ICON: &str =
    "https://solanapay.com/src/img/branding/Solanapay.com/downloads/gradient.svg";

/// Credentials for the Pusher Channels relay.
#[derive(Debug, Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
}

/// Immutable process configuration.
///
/// The two cryptographic secrets are optional on purpose: their absence is
/// a fatal misconfiguration surfaced per request as a server fault, never a
/// silently defaulted value.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    signing_secret: Option<Vec<u8>>,
    encryption_secret: Option<Vec<u8>>,
    pub domain: String,
    pub chain_id: String,
    pub statement: String,
    pub uri: String,
    pub label: String,
    pub icon: String,
    pub pusher: Option<PusherConfig>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let port = env::var(PORT_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host: env_or(HOST_ENV, DEFAULT_HOST),
            port,
            signing_secret: env::var(SIGNING_PASSWORD_ENV).ok().map(String::into_bytes),
            encryption_secret: env::var(ENCRYPTION_PASSWORD_ENV)
                .ok()
                .map(String::into_bytes),
            domain: env_or(DOMAIN_ENV, DEFAULT_DOMAIN),
            chain_id: env_or(CHAIN_ID_ENV, DEFAULT_CHAIN_ID),
            statement: env_or(STATEMENT_ENV, DEFAULT_STATEMENT),
            uri: env_or(URI_ENV, DEFAULT_URI),
            label: env_or(LABEL_ENV, DEFAULT_LABEL),
            icon: env_or(ICON_ENV, DEFAULT_ICON),
            pusher: PusherConfig::from_env(),
        }
    }

    /// The HMAC signing secret, or the configuration fault for its absence.
    pub fn signing_secret(&self) -> Result<&[u8], SignInError> {
        self.signing_secret
            .as_deref()
            .ok_or(SignInError::SigningSecretMissing)
    }

    /// The envelope encryption secret, or the configuration fault for its
    /// absence.
    pub fn encryption_secret(&self) -> Result<&[u8], SignInError> {
        self.encryption_secret
            .as_deref()
            .ok_or(SignInError::EncryptionSecretMissing)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            signing_secret: Some(b"test signing password".to_vec()),
            encryption_secret: Some(b"test encryption password".to_vec()),
            domain: DEFAULT_DOMAIN.into(),
            chain_id: DEFAULT_CHAIN_ID.into(),
            statement: DEFAULT_STATEMENT.into(),
            uri: DEFAULT_URI.into(),
            label: DEFAULT_LABEL.into(),
            icon: DEFAULT_ICON.into(),
            pusher: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn without_secrets(mut self) -> Self {
        self.signing_secret = None;
        self.encryption_secret = None;
        self
    }
}

impl PusherConfig {
    /// Present only when all four credentials are set.
    fn from_env() -> Option<Self> {
        Some(Self {
            app_id: env::var(PUSHER_APP_ID_ENV).ok()?,
            key: env::var(PUSHER_KEY_ENV).ok()?,
            secret: env::var(PUSHER_SECRET_ENV).ok()?,
            cluster: env::var(PUSHER_CLUSTER_ENV).ok()?,
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
