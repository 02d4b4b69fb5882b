// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pusher Channels publisher.
//!
//! Events go out over the Channels REST API: a single POST per event,
//! authenticated with an MD5 body checksum and an HMAC-SHA-256 request
//! signature. Short timeout, no retry; delivery is best effort.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use reqwest::Client;
use serde_json::Value;
use sha2::Sha256;

use crate::config::PusherConfig;

use super::{PairingRelay, RelayError};

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);
const AUTH_VERSION: &str = "1.0";

/// REST client for one Pusher application.
#[derive(Debug, Clone)]
pub struct PusherRelay {
    http: Client,
    app_id: String,
    key: String,
    secret: String,
    host: String,
}

impl PusherRelay {
    pub fn new(config: &PusherConfig) -> Self {
        Self {
            http: Client::new(),
            app_id: config.app_id.clone(),
            key: config.key.clone(),
            secret: config.secret.clone(),
            host: format!("api-{}.pusher.com", config.cluster),
        }
    }

    /// Build the signed publish URL for a request body.
    ///
    /// The signature covers `"POST\n{path}\n{query}"` where the query
    /// parameters must stay in alphabetical order.
    fn signed_url(&self, body: &str, timestamp: i64) -> String {
        let body_md5 = hex::encode(Md5::digest(body.as_bytes()));
        let path = format!("/apps/{}/events", self.app_id);
        let query = format!(
            "auth_key={}&auth_timestamp={}&auth_version={}&body_md5={}",
            self.key, timestamp, AUTH_VERSION, body_md5
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC key of any length is valid");
        mac.update(format!("POST\n{path}\n{query}").as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        format!(
            "https://{}{}?{}&auth_signature={}",
            self.host, path, query, signature
        )
    }
}

#[async_trait]
impl PairingRelay for PusherRelay {
    async fn publish(&self, channel: &str, event: &str, payload: Value)
        -> Result<(), RelayError> {
        // Channels expects the event data as a JSON string, not an object.
        let body = serde_json::json!({
            "name": event,
            "channel": channel,
            "data": payload.to_string(),
        })
        .to_string();

        let url = self.signed_url(&body, Utc::now().timestamp());
        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(PUBLISH_TIMEOUT)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected(format!("{status}: {detail}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay() -> PusherRelay {
        PusherRelay::new(&PusherConfig {
            app_id: "123456".into(),
            key: "app-key".into(),
            secret: "app-secret".into(),
            cluster: "eu".into(),
        })
    }

    #[test]
    fn signed_url_targets_cluster_events_endpoint() {
        let url = relay().signed_url(r#"{"name":"x"}"#, 1_700_000_000);
        assert!(url.starts_with("https://api-eu.pusher.com/apps/123456/events?"));
    }

    #[test]
    fn signed_url_carries_ordered_auth_params() {
        let url = relay().signed_url(r#"{"name":"x"}"#, 1_700_000_000);
        let query = url.split_once('?').unwrap().1;

        let keys: Vec<&str> = query
            .split('&')
            .map(|pair| pair.split_once('=').unwrap().0)
            .collect();
        assert_eq!(
            keys,
            [
                "auth_key",
                "auth_timestamp",
                "auth_version",
                "body_md5",
                "auth_signature"
            ]
        );
        assert!(query.contains("auth_key=app-key"));
        assert!(query.contains("auth_timestamp=1700000000"));
        assert!(query.contains("auth_version=1.0"));
    }

    #[test]
    fn signature_depends_on_body_and_timestamp() {
        let relay = relay();
        let first = relay.signed_url(r#"{"name":"x"}"#, 1_700_000_000);
        let same = relay.signed_url(r#"{"name":"x"}"#, 1_700_000_000);
        let other_body = relay.signed_url(r#"{"name":"y"}"#, 1_700_000_000);
        let other_time = relay.signed_url(r#"{"name":"x"}"#, 1_700_000_001);

        assert_eq!(first, same);
        assert_ne!(first, other_body);
        assert_ne!(first, other_time);
    }
}
