//! In-memory transport for tests.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use murmur_shared::protocol::{Actor, OutboundAction};
use murmur_shared::UserId;
use murmur_store::Store;

use crate::config::RelayConfig;
use crate::engine::Relay;
use crate::transport::{Transport, TransportError};

/// Records every dispatched action. Recipients marked unreachable fail;
/// recipients marked stalled never complete.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundAction>>>,
    unreachable: Arc<Mutex<HashSet<UserId>>>,
    stalled: Arc<Mutex<HashSet<UserId>>>,
}

impl RecordingTransport {
    pub fn set_stalled(&self, id: UserId) {
        self.stalled.lock().unwrap().insert(id);
    }

    pub fn set_unreachable(&self, id: UserId, unreachable: bool) {
        let mut set = self.unreachable.lock().unwrap();
        if unreachable {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    pub fn sent(&self) -> Vec<OutboundAction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, id: UserId) -> Vec<OutboundAction> {
        self.sent()
            .into_iter()
            .filter(|a| a.recipient() == id)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Transport for RecordingTransport {
    async fn dispatch(&self, action: OutboundAction) -> Result<(), TransportError> {
        let recipient = action.recipient();
        let stalled = self.stalled.lock().unwrap().contains(&recipient);
        if stalled {
            std::future::pending::<()>().await;
        }
        if self.unreachable.lock().unwrap().contains(&recipient) {
            return Err(TransportError::Unreachable(recipient.to_string()));
        }
        self.sent.lock().unwrap().push(action);
        Ok(())
    }
}

/// A relay over a fresh snapshot in a temp directory. Keep the directory
/// alive for as long as the relay is used.
pub fn relay(operator: Option<i64>) -> (Relay<RecordingTransport>, TempDir) {
    relay_with(RelayConfig {
        operator: operator.map(UserId),
        ..RelayConfig::default()
    })
}

pub fn relay_with(config: RelayConfig) -> (Relay<RecordingTransport>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_at(&snapshot_path(&dir)).unwrap();
    (Relay::new(store, RecordingTransport::default(), config), dir)
}

pub fn snapshot_path(dir: &TempDir) -> PathBuf {
    dir.path().join("relay.json")
}

pub fn actor(id: i64) -> Actor {
    Actor {
        id: UserId(id),
        handle: Some(format!("user{id}")),
        display_name: format!("User {id}"),
    }
}
