use thiserror::Error;

/// Errors reported back to the actor that triggered an operation.
///
/// Unauthorized admin access is deliberately absent: non-operators get no
/// response at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Self-targeting, malformed identity or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Recipient is banned")]
    RecipientBanned,

    #[error("Sender is banned")]
    SenderBanned,

    /// Transport-level failure. The sender's conversation state is kept.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// The snapshot could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),
}
