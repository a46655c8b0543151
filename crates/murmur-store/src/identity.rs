//! Identity store: known users and their counters.

use tracing::debug;

use murmur_shared::UserId;

use crate::models::User;
use crate::tables::Tables;

impl Tables {
    /// Create the user if absent, otherwise refresh only the handle.
    ///
    /// Returns `true` when a new record was created.
    pub fn register(&mut self, id: UserId, handle: Option<String>, display_name: String) -> bool {
        match self.users.get_mut(&id) {
            Some(user) => {
                user.handle = handle;
                false
            }
            None => {
                debug!(user = %id, "registering new user");
                self.users.insert(id, User::new(id, handle, display_name));
                true
            }
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// All known users, ordered by identity.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// No-op for unknown identities.
    pub fn increment_sent(&mut self, id: UserId) {
        if let Some(user) = self.users.get_mut(&id) {
            user.messages_sent += 1;
        }
    }

    /// No-op for unknown identities.
    pub fn increment_received(&mut self, id: UserId) {
        if let Some(user) = self.users.get_mut(&id) {
            user.messages_received += 1;
        }
    }
}
