use std::time::Duration;

use murmur_shared::constants::DEFAULT_DELIVERY_TIMEOUT_SECS;
use murmur_shared::UserId;

/// Settings the relay engine needs from its host process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// The single operator identity. `None` disables every admin feature.
    pub operator: Option<UserId>,

    /// Bot account name used to render personal links.
    pub bot_username: String,

    /// Upper bound on every outbound call to the transport.
    pub delivery_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            operator: None,
            bot_username: "murmur_bot".to_string(),
            delivery_timeout: Duration::from_secs(DEFAULT_DELIVERY_TIMEOUT_SECS),
        }
    }
}
