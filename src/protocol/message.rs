// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical sign-in message text.
//!
//! The challenge is presented to the wallet as human-readable text in the
//! standard sign-in-with-wallet layout. The exact byte sequence of this text
//! is what the wallet signs and what the integrity tag covers, so building
//! the text must be deterministic: re-serializing a parsed message yields
//! byte-identical output or verification fails.

use crate::protocol::error::SignInError;

const HEADER_SUFFIX: &str = " wants you to sign in with your Solana account:";

const URI_FIELD: &str = "URI: ";
const VERSION_FIELD: &str = "Version: ";
const CHAIN_ID_FIELD: &str = "Chain ID: ";
const NONCE_FIELD: &str = "Nonce: ";
const ISSUED_AT_FIELD: &str = "Issued At: ";
const EXPIRATION_TIME_FIELD: &str = "Expiration Time: ";

/// Parsed or to-be-serialized sign-in message fields.
///
/// The issuer fills every field. The parser is lenient: a field that is
/// absent or malformed comes back as `None`, so each verifier check fails
/// with its own named error instead of a blanket parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInMessage {
    pub domain: Option<String>,
    pub address: Option<String>,
    pub statement: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<String>,
    pub nonce: Option<String>,
    pub issued_at: Option<String>,
    pub expiration_time: Option<String>,
}

impl SignInMessage {
    /// Serialize to the canonical text layout:
    ///
    /// ```text
    /// {domain} wants you to sign in with your Solana account:
    /// {address}
    ///
    /// {statement}
    ///
    /// URI: {uri}
    /// Version: {version}
    /// Chain ID: {chain_id}
    /// Nonce: {nonce}
    /// Issued At: {issued_at}
    /// Expiration Time: {expiration_time}
    /// ```
    ///
    /// Optional fields are omitted along with their line.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{}{HEADER_SUFFIX}\n{}",
            self.domain.as_deref().unwrap_or_default(),
            self.address.as_deref().unwrap_or_default(),
        );

        if let Some(statement) = &self.statement {
            text.push_str("\n\n");
            text.push_str(statement);
        }

        let mut fields = Vec::new();
        if let Some(uri) = &self.uri {
            fields.push(format!("{URI_FIELD}{uri}"));
        }
        if let Some(version) = &self.version {
            fields.push(format!("{VERSION_FIELD}{version}"));
        }
        if let Some(chain_id) = &self.chain_id {
            fields.push(format!("{CHAIN_ID_FIELD}{chain_id}"));
        }
        if let Some(nonce) = &self.nonce {
            fields.push(format!("{NONCE_FIELD}{nonce}"));
        }
        if let Some(issued_at) = &self.issued_at {
            fields.push(format!("{ISSUED_AT_FIELD}{issued_at}"));
        }
        if let Some(expiration_time) = &self.expiration_time {
            fields.push(format!("{EXPIRATION_TIME_FIELD}{expiration_time}"));
        }
        if !fields.is_empty() {
            text.push_str("\n\n");
            text.push_str(&fields.join("\n"));
        }

        text
    }

    /// Parse message text back into fields.
    ///
    /// Never fails: unrecognized or missing parts simply leave their field
    /// as `None`. The verifier decides which absences are fatal.
    pub fn parse(text: &str) -> Self {
        let mut message = SignInMessage::default();
        let mut lines = text.lines();

        if let Some(header) = lines.next() {
            if let Some(domain) = header.strip_suffix(HEADER_SUFFIX) {
                message.domain = Some(domain.to_string());
                message.address = lines.next().map(str::to_string);
            }
        }

        for line in lines {
            if line.is_empty() {
                continue;
            }
            if let Some(uri) = line.strip_prefix(URI_FIELD) {
                message.uri = Some(uri.to_string());
            } else if let Some(version) = line.strip_prefix(VERSION_FIELD) {
                message.version = Some(version.to_string());
            } else if let Some(chain_id) = line.strip_prefix(CHAIN_ID_FIELD) {
                message.chain_id = Some(chain_id.to_string());
            } else if let Some(nonce) = line.strip_prefix(NONCE_FIELD) {
                message.nonce = Some(nonce.to_string());
            } else if let Some(issued_at) = line.strip_prefix(ISSUED_AT_FIELD) {
                message.issued_at = Some(issued_at.to_string());
            } else if let Some(expiration) = line.strip_prefix(EXPIRATION_TIME_FIELD) {
                message.expiration_time = Some(expiration.to_string());
            } else if message.statement.is_none() {
                message.statement = Some(line.to_string());
            }
        }

        message
    }
}

/// Validate a wallet address and return its raw public key bytes.
///
/// A well-formed address is base58 text decoding to exactly 32 bytes. No
/// curve check happens here; an off-curve value fails later at the
/// signature step.
pub fn parse_address(address: &str) -> Result<[u8; 32], SignInError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|_| SignInError::InvalidAddress)?;
    bytes.try_into().map_err(|_| SignInError::InvalidAddress)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_message() -> SignInMessage {
        SignInMessage {
            domain: Some("example.com".into()),
            address: Some("11111111111111111111111111111111".into()),
            statement: Some("Please sign in to connect your account!".into()),
            uri: Some("https://example.com/login".into()),
            version: Some("1".into()),
            chain_id: Some("devnet".into()),
            nonce: Some("q83vEB9eXYBfnMC9M/Wz1ita3mE=".into()),
            issued_at: Some("2024-05-01T12:00:00.000Z".into()),
            expiration_time: Some("2024-05-01T12:01:00.000Z".into()),
        }
    }

    #[test]
    fn to_text_matches_canonical_layout() {
        let text = full_message().to_text();
        assert_eq!(
            text,
            "example.com wants you to sign in with your Solana account:\n\
             11111111111111111111111111111111\n\
             \n\
             Please sign in to connect your account!\n\
             \n\
             URI: https://example.com/login\n\
             Version: 1\n\
             Chain ID: devnet\n\
             Nonce: q83vEB9eXYBfnMC9M/Wz1ita3mE=\n\
             Issued At: 2024-05-01T12:00:00.000Z\n\
             Expiration Time: 2024-05-01T12:01:00.000Z"
        );
    }

    #[test]
    fn parse_round_trips_every_field() {
        let message = full_message();
        let parsed = SignInMessage::parse(&message.to_text());
        assert_eq!(parsed, message);
    }

    #[test]
    fn reserialization_is_byte_identical() {
        let text = full_message().to_text();
        assert_eq!(SignInMessage::parse(&text).to_text(), text);
    }

    #[test]
    fn parse_tolerates_missing_fields() {
        let parsed = SignInMessage::parse(
            "example.com wants you to sign in with your Solana account:\naddr123",
        );
        assert_eq!(parsed.domain.as_deref(), Some("example.com"));
        assert_eq!(parsed.address.as_deref(), Some("addr123"));
        assert_eq!(parsed.statement, None);
        assert_eq!(parsed.nonce, None);
    }

    #[test]
    fn parse_of_garbage_yields_empty_fields() {
        let parsed = SignInMessage::parse("not a sign-in message at all");
        assert_eq!(parsed.domain, None);
        assert_eq!(parsed.address, None);
    }

    #[test]
    fn parse_address_accepts_32_byte_base58() {
        let bytes = parse_address("11111111111111111111111111111111").unwrap();
        assert_eq!(bytes, [0u8; 32]);
    }

    #[test]
    fn parse_address_rejects_bad_input() {
        // Not base58 at all.
        assert_eq!(
            parse_address("not-base58-0OIl"),
            Err(SignInError::InvalidAddress)
        );
        // Valid base58 but not 32 bytes.
        assert_eq!(parse_address("abc"), Err(SignInError::InvalidAddress));
    }
}
