//! Conversation state tracker.
//!
//! `Idle --begin(target)--> AwaitingBody(target) --deliver / cancel--> Idle`.
//! There is no timeout: a pending state only ends through an explicit clear.

use tracing::debug;

use murmur_shared::{RelayError, UserId};

use crate::models::ConversationState;
use crate::tables::Tables;

impl Tables {
    /// Current state of `owner`.
    pub fn conversation(&self, owner: UserId) -> ConversationState {
        self.user_states.get(&owner).copied().unwrap_or_default()
    }

    /// Start composing towards `target`, replacing any earlier state.
    ///
    /// The ban check happens here only; a target banned later is caught at
    /// delivery time.
    pub fn begin(&mut self, owner: UserId, target: UserId) -> Result<(), RelayError> {
        if owner == target {
            return Err(RelayError::Validation(
                "cannot send a message to yourself".to_string(),
            ));
        }
        if self.is_banned(target) {
            return Err(RelayError::RecipientBanned);
        }
        debug!(owner = %owner, "conversation started");
        self.user_states
            .insert(owner, ConversationState::AwaitingBody { target });
        Ok(())
    }

    /// Drop any pending state. Returns `true` if there was one.
    pub fn cancel(&mut self, owner: UserId) -> bool {
        self.clear(owner).is_some()
    }

    pub fn clear(&mut self, owner: UserId) -> Option<ConversationState> {
        self.user_states.remove(&owner)
    }
}
