//! The normalized in-memory representation of the snapshot.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use murmur_shared::UserId;

use crate::models::{ConversationState, MessageRecord, Statistics, User};

/// Users, conversation states, audit log, bans and statistics.
///
/// Serializes to the snapshot schema. Missing top-level keys default to empty
/// and unknown keys are ignored, so older and newer snapshots both load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Tables {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) user_states: BTreeMap<UserId, ConversationState>,
    pub(crate) messages: Vec<MessageRecord>,
    pub(crate) banned: BTreeSet<UserId>,
    pub(crate) statistics: Statistics,
}

impl Tables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current statistics, with totals derived from the tables.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            total_users: self.users.len(),
            total_messages: self.messages.len(),
            bot_started: self.statistics.bot_started,
        }
    }

    /// Bring the stored totals in line with the tables before a save.
    pub(crate) fn refresh_statistics(&mut self) {
        self.statistics = self.statistics();
    }
}
