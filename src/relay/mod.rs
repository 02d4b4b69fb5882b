// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pairing notification relay.
//!
//! After a sign-in verifies, a peer that initiated the pairing (the device
//! showing the QR code) is waiting on a pub/sub channel it chose. The relay
//! publishes the "connected" event there. The channel id routes the event
//! and carries no trust of its own; trust was established by the verifier
//! before anything is published.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub mod pusher;

pub use pusher::PusherRelay;

/// Event name the pairing peer subscribes to.
pub const ACCOUNT_CONNECTED_EVENT: &str = "account-connected";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay rejected the event: {0}")]
    Rejected(String),
}

/// Abstract publish side of the pub/sub transport.
///
/// The concrete transport is swappable; the verifier and handlers depend
/// only on this trait.
#[async_trait]
pub trait PairingRelay: Send + Sync {
    async fn publish(&self, channel: &str, event: &str, payload: Value)
        -> Result<(), RelayError>;
}

/// Publish the paired event for `account` on `channel`, best effort.
///
/// Failures are logged and swallowed: the authentication decision has
/// already been made and delivery is a courtesy to the listening peer, not
/// part of the trust boundary.
pub async fn notify_account_connected(relay: &dyn PairingRelay, channel: &str, account: &str) {
    let payload = json!({
        "account": account,
        "message": format!("GM from server! Connected to account {account}"),
    });

    if let Err(error) = relay
        .publish(channel, ACCOUNT_CONNECTED_EVENT, payload)
        .await
    {
        warn!(%channel, %error, "failed to publish pairing notification");
    }
}

/// Installed when no relay credentials are configured; drops every event.
pub struct NoopRelay;

#[async_trait]
impl PairingRelay for NoopRelay {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        _payload: Value,
    ) -> Result<(), RelayError> {
        debug!(%channel, %event, "relay disabled, dropping event");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Captures published events so tests can assert on them.
    #[derive(Default)]
    pub struct RecordingRelay {
        pub events: Mutex<Vec<(String, String, Value)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl PairingRelay for RecordingRelay {
        async fn publish(
            &self,
            channel: &str,
            event: &str,
            payload: Value,
        ) -> Result<(), RelayError> {
            if self.fail {
                return Err(RelayError::Rejected("forced failure".into()));
            }
            self.events
                .lock()
                .unwrap()
                .push((channel.to_string(), event.to_string(), payload));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingRelay;
    use super::*;

    #[tokio::test]
    async fn notify_publishes_one_event_with_account_payload() {
        let relay = RecordingRelay::default();
        notify_account_connected(&relay, "pairing-abc123", "9xQeWallet").await;

        let events = relay.events.lock().unwrap();
        assert_eq!(events.len(), 1);

        let (channel, event, payload) = &events[0];
        assert_eq!(channel, "pairing-abc123");
        assert_eq!(event, ACCOUNT_CONNECTED_EVENT);
        assert_eq!(payload["account"], "9xQeWallet");
        assert_eq!(
            payload["message"],
            "GM from server! Connected to account 9xQeWallet"
        );
    }

    #[tokio::test]
    async fn publish_failures_are_swallowed() {
        let relay = RecordingRelay {
            fail: true,
            ..Default::default()
        };
        // Must not panic or propagate.
        notify_account_connected(&relay, "pairing-abc123", "9xQeWallet").await;
        assert!(relay.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn noop_relay_accepts_everything() {
        let relay = NoopRelay;
        assert!(relay
            .publish("any-channel", ACCOUNT_CONNECTED_EVENT, json!({}))
            .await
            .is_ok());
    }
}
