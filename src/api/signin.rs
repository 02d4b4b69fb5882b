// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in endpoint handlers.
//!
//! One endpoint, dispatched on method: `GET` serves wallet-app metadata,
//! `POST` issues a challenge, `PUT` verifies the signed response and
//! notifies the pairing channel. Base64 framing is decoded here at the
//! boundary; the protocol modules only ever see raw bytes.

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::protocol::{self, StateEnvelope, SignInError};
use crate::relay::notify_account_connected;
use crate::state::AppState;

/// Static metadata shown by wallets before signing.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataResponse {
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequest {
    /// Wallet address requesting to sign in (base58 public key).
    pub account: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueResponse {
    /// Base64 of the exact message bytes the wallet must sign.
    pub data: String,
    /// Opaque state token; must come back unmodified with the signature.
    pub state: String,
    /// Human-readable prompt for the wallet UI.
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub account: String,
    /// Base64 of the signed message bytes, exactly as issued.
    pub data: String,
    /// The state token returned by the challenge response.
    pub state: String,
    /// Base64 Ed25519 detached signature over the message bytes.
    pub signature: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQuery {
    /// Pairing channel to notify once verification succeeds.
    pub channel_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/signin",
    tag = "SignIn",
    responses((status = 200, body = MetadataResponse))
)]
pub async fn metadata(State(state): State<AppState>) -> Json<MetadataResponse> {
    Json(MetadataResponse {
        label: state.config.label.clone(),
        icon: state.config.icon.clone(),
    })
}

#[utoipa::path(
    post,
    path = "/api/signin",
    tag = "SignIn",
    request_body = IssueRequest,
    responses(
        (status = 200, body = IssueResponse),
        (status = 400, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn issue(
    State(state): State<AppState>,
    Json(request): Json<IssueRequest>,
) -> Result<Json<IssueResponse>, SignInError> {
    let issued = protocol::issue(&state.config, &request.account, Utc::now())?;

    Ok(Json(IssueResponse {
        data: BASE64.encode(&issued.message),
        state: issued.state.to_wire(),
        message: issued.prompt,
    }))
}

#[utoipa::path(
    put,
    path = "/api/signin",
    tag = "SignIn",
    params(VerifyQuery),
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Signature verified; pairing peer notified"),
        (status = 400, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, SignInError> {
    // Decode failures map to the check that would fail on garbage input.
    let message = BASE64
        .decode(&request.data)
        .map_err(|_| SignInError::Integrity)?;
    let envelope = StateEnvelope::from_wire(&request.state)?;
    let signature = BASE64
        .decode(&request.signature)
        .map_err(|_| SignInError::InvalidSignature)?;

    let verified = protocol::verify(
        &state.config,
        &request.account,
        &message,
        &envelope,
        &signature,
        Utc::now(),
    )?;

    match &query.channel_id {
        Some(channel) => {
            notify_account_connected(state.relay.as_ref(), channel, &verified.address).await;
        }
        None => debug!("no channelId supplied, skipping pairing notification"),
    }

    Ok(Json(serde_json::json!({})))
}

/// Catch-all for methods outside the GET/POST/PUT contract.
pub async fn method_not_allowed(method: Method) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            message: format!("Unexpected method {method}"),
        }),
    )
}
