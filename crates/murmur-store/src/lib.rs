//! # murmur-store
//!
//! Single-node persistence for the Murmur relay.
//!
//! The whole relay state lives in one JSON snapshot. In memory it is held as
//! normalized [`Tables`] (users, bans, conversation states, audit log); every
//! mutation goes through [`Store::transact`], which writes a complete new
//! snapshot atomically before the change becomes visible.

pub mod audit;
pub mod bans;
pub mod conversations;
pub mod identity;
pub mod models;
pub mod store;
pub mod tables;

mod error;

pub use error::StoreError;
pub use models::*;
pub use store::Store;
pub use tables::Tables;
