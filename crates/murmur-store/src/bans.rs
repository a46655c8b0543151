//! Ban registry. Independent of the identity store: an identity can be banned
//! before it has ever interacted with the relay.

use tracing::info;

use murmur_shared::{BanState, UserId};

use crate::tables::Tables;

impl Tables {
    pub fn is_banned(&self, id: UserId) -> bool {
        self.banned.contains(&id)
    }

    /// Add `id` if absent, remove it otherwise. Returns the resulting state.
    pub fn toggle_ban(&mut self, id: UserId) -> BanState {
        let state = if self.banned.remove(&id) {
            BanState::Unbanned
        } else {
            self.banned.insert(id);
            BanState::Banned
        };
        info!(user = %id, ?state, "ban toggled");
        state
    }
}
