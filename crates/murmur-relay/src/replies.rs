//! Texts sent back to actors.

use murmur_shared::{BanState, RelayError, UserId};
use murmur_store::{Statistics, User};

pub const BANNED: &str = "🚫 You are banned.";
pub const RECIPIENT_BANNED: &str = "❌ The recipient is banned.";
pub const DELIVERED: &str = "✅ Delivered!";
pub const DELIVERY_FAILED: &str = "❌ Delivery failed.";
pub const CANCELLED: &str = "❌ Cancelled.";
pub const CHOOSE_ACTION: &str = "Choose an action:";
pub const INTERNAL_ERROR: &str = "⚠️ Something went wrong, please try again later.";

pub const ADMIN_PANEL: &str = "🛠 Admin panel";
pub const ASK_USER_ID: &str = "👤 Enter a user ID:";
pub const ASK_PAIR_IDS: &str = "🔄 Enter two IDs separated by a space:";
pub const ASK_BAN_ID: &str = "🚫 Enter an ID to ban or unban:";

pub fn greeting(display_name: &str) -> String {
    format!("👋 Hi, {display_name}!")
}

pub fn compose_prompt(target: UserId) -> String {
    format!("✉️ Type your message for {target}:")
}

pub fn personal_link(url: &str) -> String {
    format!("🔗 Your link: {url}")
}

pub fn personal_stats(user: Option<&User>) -> String {
    let (sent, received) = user
        .map(|u| (u.messages_sent, u.messages_received))
        .unwrap_or_default();
    format!("📊 Statistics:\n✉️ Sent: {sent}\n📩 Received: {received}")
}

pub fn global_stats(stats: &Statistics) -> String {
    format!(
        "📊 Statistics:\n👥 Users: {}\n📨 Messages: {}\n🕰 Running since: {}",
        stats.total_users,
        stats.total_messages,
        stats.bot_started.format("%Y-%m-%d %H:%M"),
    )
}

pub fn ban_transition(id: UserId, state: BanState) -> String {
    match state {
        BanState::Banned => format!("🚫 {id} banned."),
        BanState::Unbanned => format!("✅ {id} unbanned."),
    }
}

/// Reply shown to the actor when an operation fails.
pub fn for_error(err: &RelayError) -> String {
    match err {
        RelayError::Validation(reason) => format!("❌ {reason}"),
        RelayError::RecipientBanned => RECIPIENT_BANNED.to_string(),
        RelayError::SenderBanned => BANNED.to_string(),
        RelayError::DeliveryFailed(_) => DELIVERY_FAILED.to_string(),
        RelayError::Persistence(_) => INTERNAL_ERROR.to_string(),
    }
}
