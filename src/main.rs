// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wallet_signin_server::api::router;
use wallet_signin_server::config::{Config, LOG_FORMAT_ENV};
use wallet_signin_server::relay::{NoopRelay, PairingRelay, PusherRelay};
use wallet_signin_server::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();

    let relay: Arc<dyn PairingRelay> = match &config.pusher {
        Some(pusher) => Arc::new(PusherRelay::new(pusher)),
        None => {
            warn!("Pusher credentials not set, pairing notifications are disabled");
            Arc::new(NoopRelay)
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let app = router(AppState::new(config, relay));

    info!("Wallet sign-in server listening on http://{addr} (docs at /docs)");

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
