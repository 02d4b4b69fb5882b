// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Sign-In Server - Stateless Wallet Pairing Service
//!
//! Challenge-response sign-in for wallet keypairs without server-side
//! session storage: the server's per-challenge context travels inside an
//! encrypted state token held by the client, and a pub/sub relay notifies
//! the pairing peer (the QR-displaying device) once a signature verifies.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum), one method-dispatched endpoint
//! - `protocol` - challenge issuance, state envelope, response verification
//! - `crypto` - HMAC tag, scrypt KDF, AES-CBC state encryption
//! - `relay` - pairing notification transport (Pusher Channels)
//! - `config` - immutable environment configuration

pub mod api;
pub mod config;
pub mod crypto;
pub mod protocol;
pub mod relay;
pub mod state;
