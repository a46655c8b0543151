//! # murmur-shared
//!
//! Vocabulary shared by every Murmur crate: identities, the inbound event and
//! outbound action types exchanged with the chat transport, the personal link
//! format and the domain error type.

pub mod constants;
pub mod error;
pub mod link;
pub mod protocol;
pub mod types;

pub use error::RelayError;
pub use types::{BanState, MediaKind, MediaRef, UserId};
