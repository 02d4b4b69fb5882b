// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response verification.
//!
//! The read half of the stateless session: reconstruct the sealed context
//! from the returned envelope, then run the ordered checks that substitute
//! for a session lookup. Every check is terminal and has its own error;
//! order matters because each check assumes the previous ones held (the
//! integrity tag in particular guarantees the message bytes are the exact
//! bytes issued, which is what makes the later field checks meaningful).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::Config;
use crate::crypto;
use crate::protocol::envelope::{open, StateEnvelope};
use crate::protocol::error::SignInError;
use crate::protocol::message::{parse_address, SignInMessage};

/// Proof that a sign-in response passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSignIn {
    pub address: String,
}

/// Verify a signed challenge response against the returned state envelope.
///
/// Checks run in a fixed order and short-circuit on the first failure:
/// address shape, configuration, envelope decryption, integrity tag,
/// identity binding, domain, chain, freshness, nonce, and finally the
/// wallet signature itself.
pub fn verify(
    config: &Config,
    address: &str,
    message: &[u8],
    state: &StateEnvelope,
    signature: &[u8],
    now: DateTime<Utc>,
) -> Result<VerifiedSignIn, SignInError> {
    let public_key = parse_address(address)?;

    let signing_secret = config.signing_secret()?;
    let encryption_secret = config.encryption_secret()?;

    let context = open(state, encryption_secret)?;

    // The tag binds the exact message bytes issued; comparison must be
    // constant-time.
    let expected_tag = crypto::integrity_tag(message, signing_secret);
    let bound_tag = BASE64
        .decode(&context.tag)
        .map_err(|_| SignInError::Integrity)?;
    if !bool::from(bound_tag.ct_eq(&expected_tag)) {
        return Err(SignInError::Integrity);
    }

    // Past the tag check the message is known to be one we issued, so the
    // lossy parse is exact in practice; a mismatch on any binding below
    // means the request pairs the message with the wrong identity.
    let parsed = SignInMessage::parse(&String::from_utf8_lossy(message));

    if parsed.address.as_deref() != Some(address) || context.address != address {
        return Err(SignInError::AccountMismatch);
    }

    if parsed.domain.as_deref() != Some(config.domain.as_str()) {
        return Err(SignInError::DomainMismatch);
    }

    if parsed.chain_id.as_deref() != Some(config.chain_id.as_str()) {
        return Err(SignInError::ChainMismatch);
    }

    // The sealed expiry is the authoritative freshness bound.
    if now > context.expires_at {
        return Err(SignInError::Expired);
    }

    if parsed.nonce.as_deref() != Some(context.nonce.as_str()) {
        return Err(SignInError::NonceMismatch);
    }

    let verifying_key =
        VerifyingKey::from_bytes(&public_key).map_err(|_| SignInError::InvalidSignature)?;
    let signature = Signature::from_slice(signature).map_err(|_| SignInError::InvalidSignature)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignInError::InvalidSignature)?;

    debug!(address, "sign-in response verified");

    Ok(VerifiedSignIn {
        address: address.to_string(),
    })
}
