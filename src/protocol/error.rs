// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in protocol errors.
//!
//! Every verification stage has its own terminal error so failures stay
//! diagnosable; none of them short-circuits into a generic "bad request".
//! The client-facing messages are part of the wire contract and reveal which
//! stage failed. That is a deliberate tradeoff for this reference protocol
//! and is flagged in DESIGN.md.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Terminal failure of challenge issuance or response verification.
///
/// All variants map to 400 except the two configuration faults, which are
/// server errors: a missing secret is a fatal misconfiguration, not
/// something a client can correct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignInError {
    /// The account is not a well-formed wallet public key.
    #[error("Invalid public key")]
    InvalidAddress,

    /// The HMAC signing secret is not configured.
    #[error("Server signing password not set")]
    SigningSecretMissing,

    /// The state encryption secret is not configured.
    #[error("Server encryption password not set")]
    EncryptionSecretMissing,

    /// The state token could not be parsed into an envelope.
    #[error("Incorrect state")]
    MalformedState,

    /// The envelope payload failed to decrypt or deserialize.
    #[error("Error decrypting state")]
    Decryption,

    /// The message bytes do not match the tag bound into the state.
    #[error("Data didn't match expected hash")]
    Integrity,

    /// Request account, message address and state address disagree.
    #[error("Unexpected account")]
    AccountMismatch,

    /// The challenge was issued for a different domain.
    #[error("Unexpected domain")]
    DomainMismatch,

    /// The challenge was issued for a different chain.
    #[error("Unexpected chainId")]
    ChainMismatch,

    /// The challenge validity window has passed.
    #[error("Data is expired")]
    Expired,

    /// The message nonce does not match the one bound into the state.
    #[error("Nonce doesn't match")]
    NonceMismatch,

    /// The signature does not verify over the message under the account key.
    #[error("Invalid signature")]
    InvalidSignature,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl SignInError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SignInError::SigningSecretMissing | SignInError::EncryptionSecretMissing => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for SignInError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
