//! Server configuration loaded from environment variables.
//!
//! Every setting has a default so the server can start with zero
//! configuration for local development; admin features stay disabled until
//! `OPERATOR_ID` is set.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use murmur_relay::RelayConfig;
use murmur_shared::constants::{DEFAULT_DELIVERY_TIMEOUT_SECS, DEFAULT_HTTP_PORT};
use murmur_shared::UserId;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the webhook (axum) server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Snapshot file.
    /// Env: `DATABASE_PATH`
    /// Default: `None` (platform data directory).
    pub database_path: Option<PathBuf>,

    /// The single operator account.
    /// Env: `OPERATOR_ID`
    /// Default: `None` (admin features disabled).
    pub operator: Option<UserId>,

    /// Bot account name used in personal links.
    /// Env: `BOT_USERNAME`
    /// Default: `murmur_bot`
    pub bot_username: String,

    /// Base URL of the chat-platform gateway that renders outbound actions.
    /// Env: `GATEWAY_URL`
    /// Default: `http://127.0.0.1:8081`
    pub gateway_url: String,

    /// Bearer token the gateway must present on `/events`.
    /// Env: `WEBHOOK_TOKEN`
    /// Default: empty (no authentication).
    pub webhook_token: Option<String>,

    /// Upper bound on every outbound call.
    /// Env: `DELIVERY_TIMEOUT_SECS`
    /// Default: `10`
    pub delivery_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            operator: None,
            bot_username: "murmur_bot".to_string(),
            gateway_url: "http://127.0.0.1:8081".to_string(),
            webhook_token: None,
            delivery_timeout: Duration::from_secs(DEFAULT_DELIVERY_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(path) = lookup("DATABASE_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(id) = lookup("OPERATOR_ID") {
            match id.parse::<UserId>() {
                Ok(parsed) => config.operator = Some(parsed),
                Err(e) => tracing::warn!(
                    value = %id,
                    error = %e,
                    "Invalid OPERATOR_ID, admin features disabled"
                ),
            }
        }

        if let Some(name) = lookup("BOT_USERNAME").filter(|n| !n.is_empty()) {
            config.bot_username = name.trim_start_matches('@').to_string();
        }

        if let Some(url) = lookup("GATEWAY_URL").filter(|u| !u.is_empty()) {
            config.gateway_url = url.trim_end_matches('/').to_string();
        }

        if let Some(token) = lookup("WEBHOOK_TOKEN") {
            if !token.is_empty() {
                config.webhook_token = Some(token);
            }
        }

        if let Some(val) = lookup("DELIVERY_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.delivery_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid DELIVERY_TIMEOUT_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            operator: self.operator,
            bot_username: self.bot_username.clone(),
            delivery_timeout: self.delivery_timeout,
        }
    }
}
