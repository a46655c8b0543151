//! The seam between the relay and the chat platform.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use murmur_shared::protocol::OutboundAction;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The recipient cannot be reached (unknown chat, blocked the bot, ...).
    #[error("Recipient unreachable: {0}")]
    Unreachable(String),

    /// The platform refused the action.
    #[error("Action rejected: {0}")]
    Rejected(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Carries [`OutboundAction`]s to the platform.
///
/// Implementations report failures instead of panicking; the relay bounds
/// every call with its configured delivery timeout.
pub trait Transport: Send + Sync + 'static {
    fn dispatch(
        &self,
        action: OutboundAction,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Run `transport.dispatch(action)` with an upper bound on its duration.
pub async fn dispatch_bounded<T: Transport>(
    transport: &T,
    action: OutboundAction,
    limit: Duration,
) -> Result<(), TransportError> {
    match tokio::time::timeout(limit, transport.dispatch(action)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}
