//! # murmur-relay
//!
//! The anonymous relay engine. A [`Relay`] consumes [`InboundEvent`]s from
//! the chat transport, tracks who is composing a message to whom, forwards
//! message bodies with the sender's identity removed, keeps the audit log and
//! serves the operator's moderation queries.
//!
//! [`InboundEvent`]: murmur_shared::protocol::InboundEvent

pub mod admin;
pub mod commands;
pub mod config;
pub mod engine;
pub mod replies;
pub mod transport;

mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::messaging::{Body, StartOutcome};
pub use config::RelayConfig;
pub use engine::Relay;
pub use transport::{Transport, TransportError};
