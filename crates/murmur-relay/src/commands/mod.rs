//! Inbound event handlers.
//!
//! Each sub-module adds an `impl Relay<T>` block for one group of commands,
//! callbacks and messages.

pub mod account;
pub mod admin;
pub mod messaging;
