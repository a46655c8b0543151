//! HTTP transport towards the chat-platform gateway.
//!
//! Every outbound action is POSTed as JSON to `{GATEWAY_URL}/actions`. The
//! gateway answers 2xx once the platform accepted the action.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use murmur_relay::{Transport, TransportError};
use murmur_shared::protocol::OutboundAction;

#[derive(Clone)]
pub struct GatewayTransport {
    client: reqwest::Client,
    actions_url: String,
    timeout: Duration,
}

impl GatewayTransport {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    fn with_client(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            actions_url: format!("{}/actions", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

fn classify(err: &reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Unreachable(format!("gateway request failed: {err}"))
    }
}

impl Transport for GatewayTransport {
    async fn dispatch(&self, action: OutboundAction) -> Result<(), TransportError> {
        let to = action.recipient();
        let response = self
            .client
            .post(&self.actions_url)
            .json(&action)
            .send()
            .await
            .map_err(|e| classify(&e, self.timeout))?;

        let status = response.status();
        if status.is_success() {
            debug!(user = %to, "action accepted by gateway");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::GONE => Err(
                TransportError::Unreachable(format!("{status}: {detail}")),
            ),
            _ => Err(TransportError::Rejected(format!("{status}: {detail}"))),
        }
    }
}
