// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::Config;
use crate::relay::PairingRelay;

/// Shared request state: immutable configuration plus the pairing relay.
///
/// The protocol itself is stateless per request; nothing here is mutated
/// after startup, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<dyn PairingRelay>,
}

impl AppState {
    pub fn new(config: Config, relay: Arc<dyn PairingRelay>) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub(crate) fn for_tests() -> Self {
        Self::new(Config::for_tests(), Arc::new(crate::relay::NoopRelay))
    }

    pub(crate) fn with_relay(relay: Arc<dyn PairingRelay>) -> Self {
        Self::new(Config::for_tests(), relay)
    }
}
