// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted state envelope.
//!
//! The server never stores a session. Instead the context it needs at
//! verification time is sealed into an opaque envelope and handed to the
//! client, which must return it verbatim. The envelope is the trust
//! boundary: whoever can decrypt it is the server, everyone else carries it
//! as a capability token.
//!
//! Wire format: `base64( JSON{ encryptedData, salt, iv } )` with base64
//! values inside the JSON as well. The seal/open pair is the single seam
//! where a different sealing primitive would be swapped in.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{self, CryptoError};
use crate::protocol::error::SignInError;

/// Server-held context for one issued challenge.
///
/// Exists only in plaintext inside the server: it is built at issuance,
/// sealed, and reconstructed from the returned envelope at verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Base64 HMAC digest binding the exact challenge message bytes.
    pub tag: String,
    /// Wallet address the challenge was issued for.
    pub address: String,
    /// Hard freshness bound for the round trip.
    pub expires_at: DateTime<Utc>,
    /// Single-use random value embedded in the challenge text.
    pub nonce: String,
}

/// The wire-visible state token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEnvelope {
    #[serde(rename = "encryptedData", with = "base64_bytes")]
    pub encrypted_data: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub iv: Vec<u8>,
}

impl StateEnvelope {
    /// Encode for the wire: base64 over the JSON object.
    pub fn to_wire(&self) -> String {
        // A struct of byte strings always serializes.
        let json = serde_json::to_vec(self).expect("envelope serializes to JSON");
        BASE64.encode(json)
    }

    /// Decode a wire token. Anything that is not base64-wrapped envelope
    /// JSON is a malformed state, not a decryption failure.
    pub fn from_wire(wire: &str) -> Result<Self, SignInError> {
        let json = BASE64
            .decode(wire.trim())
            .map_err(|_| SignInError::MalformedState)?;
        serde_json::from_slice(&json).map_err(|_| SignInError::MalformedState)
    }
}

/// Seal a session context under the encryption secret.
///
/// A fresh 32-byte salt is drawn per call, so two envelopes for identical
/// contexts are unlinkable.
pub fn seal(
    context: &SessionContext,
    encryption_secret: &[u8],
) -> Result<StateEnvelope, SignInError> {
    let salt = crypto::generate_salt();
    let key = crypto::derive_key(encryption_secret, &salt)?;

    // SessionContext always serializes; any failure here is a sealing failure.
    let plaintext = serde_json::to_vec(context).map_err(|_| SignInError::Decryption)?;
    let (encrypted_data, iv) = crypto::encrypt(&plaintext, &key);

    Ok(StateEnvelope {
        encrypted_data,
        salt: salt.to_vec(),
        iv: iv.to_vec(),
    })
}

/// Open an envelope back into its session context.
///
/// The key is re-derived from the embedded salt; decryption or plaintext
/// parse failure both mean the state is corrupt or forged.
pub fn open(
    envelope: &StateEnvelope,
    encryption_secret: &[u8],
) -> Result<SessionContext, SignInError> {
    let key = crypto::derive_key(encryption_secret, &envelope.salt)?;
    let plaintext = crypto::decrypt(&envelope.encrypted_data, &key, &envelope.iv)?;
    serde_json::from_slice(&plaintext).map_err(|_| SignInError::Decryption)
}

impl From<CryptoError> for SignInError {
    fn from(_: CryptoError) -> Self {
        // Key derivation with the fixed parameters cannot fail, so every
        // crypto failure surfaced here is a decryption failure.
        SignInError::Decryption
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_context() -> SessionContext {
        SessionContext {
            tag: "c2FtcGxlLXRhZw==".into(),
            address: "11111111111111111111111111111111".into(),
            expires_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 0).unwrap(),
            nonce: "q83vEB9eXYBfnMC9M/Wz1ita3mE=".into(),
        }
    }

    #[test]
    fn seal_open_round_trip() {
        let context = sample_context();
        let envelope = seal(&context, b"encryption password").unwrap();
        let opened = open(&envelope, b"encryption password").unwrap();
        assert_eq!(opened, context);
    }

    #[test]
    fn open_with_wrong_secret_fails() {
        let envelope = seal(&sample_context(), b"encryption password").unwrap();
        let result = open(&envelope, b"wrong password");
        // Wrong key: padding failure or garbage that is not context JSON.
        assert_eq!(result, Err(SignInError::Decryption));
    }

    #[test]
    fn open_rejects_tampered_ciphertext() {
        let mut envelope = seal(&sample_context(), b"secret").unwrap();
        let last = envelope.encrypted_data.len() - 1;
        envelope.encrypted_data[last] ^= 0x01;
        assert_eq!(open(&envelope, b"secret"), Err(SignInError::Decryption));
    }

    #[test]
    fn fresh_salt_per_seal() {
        let context = sample_context();
        let first = seal(&context, b"secret").unwrap();
        let second = seal(&context, b"secret").unwrap();
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.encrypted_data, second.encrypted_data);
    }

    #[test]
    fn wire_round_trip() {
        let envelope = seal(&sample_context(), b"secret").unwrap();
        let wire = envelope.to_wire();
        let decoded = StateEnvelope::from_wire(&wire).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn wire_json_uses_contract_field_names() {
        let envelope = StateEnvelope {
            encrypted_data: vec![1, 2, 3],
            salt: vec![4; 32],
            iv: vec![5; 16],
        };
        let json: serde_json::Value =
            serde_json::from_slice(&BASE64.decode(envelope.to_wire()).unwrap()).unwrap();
        assert!(json.get("encryptedData").is_some());
        assert!(json.get("salt").is_some());
        assert!(json.get("iv").is_some());
    }

    #[test]
    fn from_wire_rejects_garbage() {
        assert_eq!(
            StateEnvelope::from_wire("%%% not base64 %%%"),
            Err(SignInError::MalformedState)
        );
        // Valid base64, but not envelope JSON.
        assert_eq!(
            StateEnvelope::from_wire(&BASE64.encode(b"random bytes")),
            Err(SignInError::MalformedState)
        );
    }
}
