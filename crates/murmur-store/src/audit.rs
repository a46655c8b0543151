//! Append-only audit log of relayed messages.

use murmur_shared::UserId;

use crate::models::MessageRecord;
use crate::tables::Tables;

impl Tables {
    pub fn append(&mut self, record: MessageRecord) {
        self.messages.push(record);
    }

    /// Every record, in append order.
    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }

    /// Records matching `predicate`, in append order.
    pub fn query<F>(&self, predicate: F) -> Vec<&MessageRecord>
    where
        F: Fn(&MessageRecord) -> bool,
    {
        self.messages.iter().filter(|m| predicate(*m)).collect()
    }

    pub fn records_for(&self, id: UserId) -> Vec<&MessageRecord> {
        self.query(|m| m.involves(id))
    }

    pub fn records_between(&self, a: UserId, b: UserId) -> Vec<&MessageRecord> {
        self.query(|m| m.between(a, b))
    }
}

/// The last `n` elements of `items`, in their original order.
pub fn tail_window<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}
