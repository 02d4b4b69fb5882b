// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge issuance.
//!
//! Issuing is the write half of the stateless session: build the challenge
//! text, tag it, seal the context the verifier will need, and forget
//! everything. The only durable copy of the context is the envelope the
//! client carries.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::{rngs::OsRng, RngCore};
use tracing::debug;

use crate::config::Config;
use crate::crypto;
use crate::protocol::envelope::{self, SessionContext, StateEnvelope};
use crate::protocol::error::SignInError;
use crate::protocol::message::{parse_address, SignInMessage};

/// Fixed challenge validity window.
pub const CHALLENGE_TTL_MS: i64 = 60_000;

/// Nonce entropy in bytes, base64-encoded into the challenge text.
const NONCE_LEN: usize = 20;

/// Sign-in message format version.
const CHALLENGE_VERSION: &str = "1";

/// Human-readable prompt returned with the challenge.
const SIGN_PROMPT: &str = "Please sign to connect your account!";

/// Everything handed back to the client after issuance.
///
/// `message` is the exact byte sequence the wallet must sign; `state` must
/// be returned verbatim with the signature.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub message: Vec<u8>,
    pub state: StateEnvelope,
    pub prompt: String,
}

/// Issue a sign-in challenge for `address`, valid for 60 seconds from `now`.
///
/// Fails fast on a malformed address before any crypto work, and with a
/// configuration fault if either server secret is missing.
pub fn issue(
    config: &Config,
    address: &str,
    now: DateTime<Utc>,
) -> Result<IssuedChallenge, SignInError> {
    parse_address(address)?;

    let signing_secret = config.signing_secret()?;
    let encryption_secret = config.encryption_secret()?;

    let expires_at = now + Duration::milliseconds(CHALLENGE_TTL_MS);
    let nonce = generate_nonce();

    let message = SignInMessage {
        domain: Some(config.domain.clone()),
        address: Some(address.to_string()),
        statement: Some(config.statement.clone()),
        uri: Some(config.uri.clone()),
        version: Some(CHALLENGE_VERSION.to_string()),
        chain_id: Some(config.chain_id.clone()),
        nonce: Some(nonce.clone()),
        issued_at: Some(format_timestamp(now)),
        expiration_time: Some(format_timestamp(expires_at)),
    };
    let message_bytes = message.to_text().into_bytes();

    let tag = crypto::integrity_tag(&message_bytes, signing_secret);
    let context = SessionContext {
        tag: BASE64.encode(tag),
        address: address.to_string(),
        expires_at,
        nonce,
    };
    let state = envelope::seal(&context, encryption_secret)?;

    debug!(address, "issued sign-in challenge");

    Ok(IssuedChallenge {
        message: message_bytes,
        state,
        prompt: SIGN_PROMPT.to_string(),
    })
}

/// Timestamps in the challenge text: RFC 3339 with millisecond precision,
/// `Z` suffix. Matches what JavaScript `toISOString` produces, which is the
/// format wallets already render.
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}
