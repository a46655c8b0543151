//! # murmur-server
//!
//! Webhook front end for the murmur anonymous relay.
//!
//! The chat-platform gateway POSTs inbound events to `/events`; the relay
//! answers by POSTing outbound actions back to the gateway. State lives in
//! a single JSON snapshot rewritten atomically after every change.

mod api;
mod config;
mod error;
mod gateway;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use murmur_relay::Relay;
use murmur_store::Store;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::gateway::GatewayTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,murmur_server=debug,murmur_relay=debug")
        }))
        .init();

    info!("Starting murmur relay v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        http_addr = %config.http_addr,
        gateway = %config.gateway_url,
        bot = %config.bot_username,
        admin_enabled = config.operator.is_some(),
        webhook_auth = config.webhook_token.is_some(),
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Open the snapshot; a corrupt file aborts startup untouched
    // -----------------------------------------------------------------------
    let store = match &config.database_path {
        Some(path) => Store::open_at(path)?,
        None => Store::new()?,
    };
    info!(
        path = %store.path().display(),
        users = store.tables().statistics().total_users,
        "Snapshot loaded"
    );

    // -----------------------------------------------------------------------
    // 4. Wire the relay to the gateway
    // -----------------------------------------------------------------------
    let transport = GatewayTransport::new(&config.gateway_url, config.delivery_timeout)?;
    let relay = Arc::new(Relay::new(store, transport, config.relay_config()));

    let app_state = AppState {
        relay,
        webhook_token: config.webhook_token.as_deref().map(Arc::from),
    };

    // -----------------------------------------------------------------------
    // 5. Run the webhook server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
