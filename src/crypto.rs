// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Keyed hashing and state-token encryption primitives.
//!
//! The sign-in protocol keeps no server-side session state. Everything the
//! server must "remember" between issuing a challenge and verifying the
//! response travels inside an encrypted blob held by the client, so these
//! primitives stand in for a session database:
//!
//! - `integrity_tag` binds the exact challenge bytes to the encrypted state.
//! - `derive_key` stretches the encryption password with a per-token salt.
//! - `encrypt`/`decrypt` seal and open the state payload.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Symmetric key length (AES-256).
pub const KEY_LEN: usize = 32;
/// Per-token key derivation salt length.
pub const SALT_LEN: usize = 32;
/// AES-CBC initialization vector length.
pub const IV_LEN: usize = 16;

/// scrypt cost parameters: N = 2^14, r = 8, p = 1. These are the common
/// library defaults; changing them invalidates every outstanding token.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Wrong key, wrong IV, truncated ciphertext or corrupted padding.
    /// Callers must treat this as "state is corrupt or forged".
    #[error("decryption failed")]
    Decryption,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// HMAC-SHA-256 over `message`, keyed by the server signing secret.
///
/// Deterministic: the same message and secret always produce the same tag.
pub fn integrity_tag(message: &[u8], signing_secret: &[u8]) -> [u8; 32] {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac =
        HmacSha256::new_from_slice(signing_secret).expect("HMAC key of any length is valid");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Derive a 32-byte AES key from the encryption password and a salt.
///
/// Deterministic for identical inputs; distinct salts yield unlinkable keys.
/// The salt is generated fresh for every issued token and never reused.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password, salt, &params, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Generate a fresh random salt for key derivation.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// AES-256-CBC encrypt with PKCS#7 padding and a fresh random IV.
///
/// The IV is returned alongside the ciphertext and must accompany it to
/// `decrypt`. An IV is never reused across encryptions under the same key.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN]) -> (Vec<u8>, [u8; IV_LEN]) {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext =
        Aes256CbcEnc::new(key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    (ciphertext, iv)
}

/// AES-256-CBC decrypt with PKCS#7 unpadding.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8; KEY_LEN],
    iv: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| CryptoError::Decryption)?;

    Aes256CbcDec::new(key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption)
}
