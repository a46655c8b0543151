//! Per-identity serialization of inbound events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use murmur_shared::UserId;

type Slots = HashMap<UserId, Arc<AsyncMutex<()>>>;

/// One async lock per identity, so that events from the same actor are
/// processed one at a time while different actors proceed concurrently.
///
/// Entries live only while someone holds or waits for them.
#[derive(Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<Slots>,
}

impl SessionLocks {
    pub(crate) async fn acquire(&self, id: UserId) -> SessionGuard<'_> {
        let lock = {
            let mut slots = self.slots();
            slots.entry(id).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        SessionGuard {
            sessions: self,
            id,
            guard: Some(guard),
        }
    }

    // The map is only touched in short synchronous sections; a poisoned
    // lock still holds a consistent map.
    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots().len()
    }
}

/// Held for the duration of one event.
pub(crate) struct SessionGuard<'a> {
    sessions: &'a SessionLocks,
    id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut slots = self.sessions.slots();
        if slots
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            slots.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_identity_is_serialized() {
        let sessions = SessionLocks::default();
        let _held = sessions.acquire(UserId(1)).await;

        let second = tokio::time::timeout(Duration::from_millis(50), sessions.acquire(UserId(1))).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn different_identities_do_not_block() {
        let sessions = SessionLocks::default();
        let _held = sessions.acquire(UserId(1)).await;

        let other = tokio::time::timeout(Duration::from_millis(50), sessions.acquire(UserId(2))).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_evicted() {
        let sessions = SessionLocks::default();
        for id in 0..100 {
            let _guard = sessions.acquire(UserId(id)).await;
        }
        assert_eq!(sessions.len(), 0);
    }

    #[tokio::test]
    async fn entry_survives_while_another_event_waits() {
        let sessions = Arc::new(SessionLocks::default());
        let first = sessions.acquire(UserId(1)).await;

        let waiter = {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                let _second = sessions.acquire(UserId(1)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(sessions.len(), 1);

        waiter.await.unwrap();
        assert_eq!(sessions.len(), 0);
    }
}
