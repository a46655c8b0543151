//! Messages exchanged with the chat-platform transport.
//!
//! The transport turns platform updates into [`InboundEvent`]s and renders
//! [`OutboundAction`]s (including keyboards) back onto the platform.

use serde::{Deserialize, Serialize};

use crate::types::{MediaRef, UserId};

/// The account that produced an inbound event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub display_name: String,
}

/// A slash command such as `/start 200`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Button presses understood by the relay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallbackAction {
    GetLink,
    GetStats,
    CancelAnon,
    AdmBackToMain,
    AdmClose,
    AdmAllUsers,
    AdmLogsMain,
    AdmFindUser,
    AdmFindPair,
    AdmBanPanel,
    AdmGlobalStats,
    #[serde(other)]
    Unknown,
}

/// One update from the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundEvent {
    pub actor: Actor,
    #[serde(default)]
    pub command: Option<Command>,
    #[serde(default)]
    pub callback: Option<CallbackAction>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media: Option<MediaRef>,
    /// Platform id of the message that carried the event, if any.
    #[serde(default)]
    pub message_id: Option<i64>,
}

impl InboundEvent {
    /// A plain text message from `actor`.
    pub fn text(actor: Actor, text: impl Into<String>) -> Self {
        Self {
            actor,
            command: None,
            callback: None,
            text: Some(text.into()),
            media: None,
            message_id: None,
        }
    }

    pub fn command(actor: Actor, name: &str, args: &[&str]) -> Self {
        Self {
            actor,
            command: Some(Command {
                name: name.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            }),
            callback: None,
            text: None,
            media: None,
            message_id: None,
        }
    }

    pub fn callback(actor: Actor, action: CallbackAction) -> Self {
        Self {
            actor,
            command: None,
            callback: Some(action),
            text: None,
            media: None,
            message_id: None,
        }
    }

    pub fn media(actor: Actor, media: MediaRef) -> Self {
        Self {
            actor,
            command: None,
            callback: None,
            text: None,
            media: Some(media),
            message_id: None,
        }
    }
}

/// Keyboards the transport knows how to render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Keyboard {
    /// Link, statistics and support buttons.
    Main,
    /// Single "cancel" button shown while composing.
    CancelCompose,
    Admin,
    BackToAdmin,
}

/// Something the transport must do on the platform.
///
/// None of the variants carry the identity of the person who composed a
/// relayed message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundAction {
    SendText {
        to: UserId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    SendMedia {
        to: UserId,
        media: MediaRef,
        caption: Option<String>,
    },
    EditLastMessage {
        to: UserId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    DeleteMessage {
        to: UserId,
        message_id: Option<i64>,
    },
}

impl OutboundAction {
    pub fn recipient(&self) -> UserId {
        match self {
            Self::SendText { to, .. }
            | Self::SendMedia { to, .. }
            | Self::EditLastMessage { to, .. }
            | Self::DeleteMessage { to, .. } => *to,
        }
    }
}
