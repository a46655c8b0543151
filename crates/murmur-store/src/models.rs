//! Domain model structs persisted in the relay snapshot.
//!
//! Field names on disk follow the snapshot schema (`user_id`, `username`,
//! `from`, `to`, ...), which is why several fields carry serde renames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_shared::constants::MEDIA_PLACEHOLDER;
use murmur_shared::UserId;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A participant seen by the relay. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: UserId,
    /// Platform handle, refreshed on every interaction.
    #[serde(rename = "username")]
    pub handle: Option<String>,
    #[serde(rename = "full_name")]
    pub display_name: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub first_seen: DateTime<Utc>,
    pub messages_sent: u64,
    pub messages_received: u64,
}

impl User {
    pub fn new(id: UserId, handle: Option<String>, display_name: String) -> Self {
        Self {
            id,
            handle,
            display_name,
            first_seen: Utc::now(),
            messages_sent: 0,
            messages_received: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation state
// ---------------------------------------------------------------------------

/// Where an identity is in the compose-and-send flow.
///
/// Only `AwaitingBody` is ever stored; an absent entry means `Idle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    #[serde(rename = "waiting_anon")]
    AwaitingBody {
        #[serde(rename = "target_id")]
        target: UserId,
    },
}

impl ConversationState {
    pub fn target(&self) -> Option<UserId> {
        match self {
            Self::Idle => None,
            Self::AwaitingBody { target } => Some(*target),
        }
    }
}

// ---------------------------------------------------------------------------
// Message record
// ---------------------------------------------------------------------------

/// One successfully relayed message. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRecord {
    #[serde(rename = "from")]
    pub sender: UserId,
    #[serde(rename = "to")]
    pub recipient: UserId,
    #[serde(rename = "date", deserialize_with = "timestamp::deserialize")]
    pub sent_at: DateTime<Utc>,
    /// Message text, or [`MEDIA_PLACEHOLDER`] for media.
    pub content: String,
}

impl MessageRecord {
    pub fn text(sender: UserId, recipient: UserId, text: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            sent_at: Utc::now(),
            content: text.into(),
        }
    }

    pub fn media(sender: UserId, recipient: UserId) -> Self {
        Self::text(sender, recipient, MEDIA_PLACEHOLDER)
    }

    pub fn involves(&self, id: UserId) -> bool {
        self.sender == id || self.recipient == id
    }

    /// True for a record exchanged between `a` and `b` in either direction.
    pub fn between(&self, a: UserId, b: UserId) -> bool {
        (self.sender == a && self.recipient == b) || (self.sender == b && self.recipient == a)
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Global counters. The totals are derived from the tables on every save;
/// `bot_started` is set once when the snapshot is first created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    #[serde(default)]
    pub total_users: usize,
    #[serde(default)]
    pub total_messages: usize,
    #[serde(default = "Utc::now", deserialize_with = "timestamp::deserialize")]
    pub bot_started: DateTime<Utc>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            total_users: 0,
            total_messages: 0,
            bot_started: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Timestamps are written as RFC 3339. Older snapshots hold naive ISO 8601
/// local times without an offset; those are read as UTC.
mod timestamp {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};
    use serde::de::Error;
    use serde::Deserializer;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}
