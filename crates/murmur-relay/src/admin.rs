//! Operator capability, audit queries and the operator dialog.
//!
//! Every query is a method on [`OperatorToken`], and the only way to obtain a
//! token is [`OperatorGate::authorize`]. Callers that are not the operator
//! get `None` and are expected to stay silent.

use std::fmt;

use murmur_shared::constants::LOG_WINDOW;
use murmur_shared::{BanState, UserId};
use murmur_store::audit::tail_window;
use murmur_store::{MessageRecord, Statistics, Tables};

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct OperatorGate {
    operator: Option<UserId>,
}

impl OperatorGate {
    pub fn new(operator: Option<UserId>) -> Self {
        Self { operator }
    }

    pub fn authorize(&self, actor: UserId) -> Option<OperatorToken> {
        match self.operator {
            Some(operator) if operator == actor => Some(OperatorToken { operator }),
            _ => None,
        }
    }
}

/// Proof that the holder is the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorToken {
    operator: UserId,
}

impl OperatorToken {
    pub fn operator(&self) -> UserId {
        self.operator
    }

    pub fn list_users(&self, tables: &Tables) -> Vec<UserSummary> {
        tables
            .users()
            .map(|u| UserSummary::for_identity(tables, u.id))
            .collect()
    }

    /// The latest records of the whole log.
    pub fn recent_logs<'a>(&self, tables: &'a Tables) -> Vec<&'a MessageRecord> {
        tail_window(tables.messages(), LOG_WINDOW).iter().collect()
    }

    pub fn logs_for_identity<'a>(&self, tables: &'a Tables, id: UserId) -> Vec<&'a MessageRecord> {
        tail_window(&tables.records_for(id), LOG_WINDOW).to_vec()
    }

    pub fn logs_for_pair<'a>(
        &self,
        tables: &'a Tables,
        a: UserId,
        b: UserId,
    ) -> Vec<&'a MessageRecord> {
        tail_window(&tables.records_between(a, b), LOG_WINDOW).to_vec()
    }

    pub fn toggle_ban(&self, tables: &mut Tables, id: UserId) -> BanState {
        tables.toggle_ban(id)
    }

    pub fn global_stats(&self, tables: &Tables) -> Statistics {
        tables.statistics()
    }
}

// ---------------------------------------------------------------------------
// Display summaries
// ---------------------------------------------------------------------------

/// One line describing an identity: id, handle if known, ban marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub handle: Option<String>,
    pub banned: bool,
}

impl UserSummary {
    /// Works for identities the store has never seen.
    pub fn for_identity(tables: &Tables, id: UserId) -> Self {
        Self {
            id,
            handle: tables.user(id).and_then(|u| u.handle.clone()),
            banned: tables.is_banned(id),
        }
    }
}

impl fmt::Display for UserSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(handle) = &self.handle {
            write!(f, " (@{handle})")?;
        }
        if self.banned {
            write!(f, " [BANNED]")?;
        }
        Ok(())
    }
}

/// Render a bounded log view. `records` is expected to be a tail window.
pub fn format_records(tables: &Tables, records: &[&MessageRecord], title: &str) -> String {
    if records.is_empty() {
        return "📭 No messages found.".to_string();
    }

    let mut out = format!("{title}\n{}\n", "—".repeat(15));
    for record in records {
        out.push_str(&format!(
            "🕒 {}\nFrom: {}\nTo: {}\n📝 {}\n\n",
            record.sent_at.format("%H:%M"),
            UserSummary::for_identity(tables, record.sender),
            UserSummary::for_identity(tables, record.recipient),
            record.content,
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Operator dialog
// ---------------------------------------------------------------------------

/// What the operator's next text input will be used for.
///
/// Any pending step is consumed by the next input, even when that input
/// does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorDialog {
    #[default]
    Idle,
    AwaitingUserId,
    AwaitingPairIds,
    AwaitingBanId,
}

/// Parse "A B" into two identities.
pub fn parse_pair(input: &str) -> Option<(UserId, UserId)> {
    let mut parts = input.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((a, b))
}
