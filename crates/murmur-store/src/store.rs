//! Snapshot file management.
//!
//! The [`Store`] owns the in-memory [`Tables`] and the path of the snapshot
//! they were loaded from. Every mutation is staged on a copy, written to a
//! temp file next to the snapshot and atomically renamed over it; only then
//! does the copy replace the live tables. A failed write leaves both the file
//! and the in-memory state as they were.

use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::tables::Tables;

const SNAPSHOT_FILE: &str = "murmur.json";

pub struct Store {
    path: PathBuf,
    tables: Tables,
}

impl Store {
    /// Open (or create) the snapshot in the default application directory.
    ///
    /// - Linux:   `~/.local/share/murmur/murmur.json`
    /// - macOS:   `~/Library/Application Support/com.murmur.murmur/murmur.json`
    /// - Windows: `{FOLDERID_RoamingAppData}\murmur\murmur\data\murmur.json`
    pub fn new() -> Result<Self> {
        Self::open_at(&Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("com", "murmur", "murmur").ok_or(StoreError::NoDataDir)?;
        Ok(project_dirs.data_dir().join(SNAPSHOT_FILE))
    }

    /// Open (or create) a snapshot at an explicit path.
    ///
    /// A missing file starts a fresh state, which is written immediately so
    /// the start timestamp survives restarts. An unreadable file is an error;
    /// it is never replaced by an empty state.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tables = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let mut tables: Tables =
                serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            tables.refresh_statistics();
            info!(
                path = %path.display(),
                users = tables.users.len(),
                messages = tables.messages.len(),
                "loaded snapshot"
            );
            tables
        } else {
            let mut tables = Tables::new();
            tables.refresh_statistics();
            write_snapshot(path, &tables)?;
            info!(path = %path.display(), "created new snapshot");
            tables
        };

        Ok(Self {
            path: path.to_path_buf(),
            tables,
        })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` to a copy of the tables and persist the result.
    ///
    /// If `f` fails nothing is written. If the write fails the live tables
    /// are untouched. Either way the error is returned to the caller.
    pub fn transact<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Tables) -> std::result::Result<R, E>,
        E: From<StoreError>,
    {
        let mut staged = self.tables.clone();
        let out = f(&mut staged)?;
        staged.refresh_statistics();
        write_snapshot(&self.path, &staged)?;
        self.tables = staged;
        Ok(out)
    }
}

fn write_snapshot(path: &Path, tables: &Tables) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, tables)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    debug!(path = %path.display(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationState, MessageRecord};
    use murmur_shared::{RelayError, UserId};

    #[test]
    fn open_creates_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("relay.json");

        let store = Store::open_at(&path).expect("should open");
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.tables().statistics().total_users, 0);
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");

        let mut store = Store::open_at(&path).unwrap();
        store
            .transact(|t| {
                t.register(UserId(100), Some("alice".to_string()), "Alice".to_string());
                t.register(UserId(200), None, "Bob".to_string());
                t.begin(UserId(100), UserId(200))?;
                t.append(MessageRecord::text(UserId(200), UserId(100), "hello"));
                t.append(MessageRecord::media(UserId(100), UserId(200)));
                t.increment_sent(UserId(200));
                t.toggle_ban(UserId(300));
                Ok::<_, RelayError>(())
            })
            .unwrap();

        let reopened = Store::open_at(&path).unwrap();
        assert_eq!(reopened.tables(), store.tables());
        assert_eq!(
            reopened.tables().conversation(UserId(100)),
            ConversationState::AwaitingBody { target: UserId(200) }
        );
        assert_eq!(reopened.tables().statistics().total_messages, 2);
    }

    #[test]
    fn empty_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");

        let store = Store::open_at(&path).unwrap();
        let reopened = Store::open_at(&path).unwrap();
        assert_eq!(reopened.tables(), store.tables());
    }

    #[test]
    fn failed_transaction_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        let mut store = Store::open_at(&path).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = store.transact(|t| {
            t.register(UserId(1), None, "One".to_string());
            t.begin(UserId(1), UserId(1))
        });

        assert!(matches!(result, Err(RelayError::Validation(_))));
        assert!(store.tables().user(UserId(1)).is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn corrupt_snapshot_is_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Store::open_at(&path).err().expect("should fail");
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn legacy_snapshot_with_naive_timestamps_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        std::fs::write(
            &path,
            r#"{
                "users": {
                    "100": {"user_id": 100, "username": "alice", "full_name": "Alice",
                            "first_seen": "2024-03-01T12:30:05.123456",
                            "messages_sent": 1, "messages_received": 0}
                },
                "user_states": {"200": {"state": "waiting_anon", "target_id": 100}},
                "messages": [{"from": 100, "to": 300, "date": "2024-03-01T12:31:00.000001", "content": "hi"}],
                "banned": [300],
                "statistics": {"total_messages": 1, "total_users": 1, "bot_started": "2024-03-01T12:00:00"}
            }"#,
        )
        .unwrap();

        let store = Store::open_at(&path).expect("legacy snapshot should load");
        let tables = store.tables();
        assert_eq!(tables.user(UserId(100)).unwrap().messages_sent, 1);
        assert_eq!(tables.conversation(UserId(200)).target(), Some(UserId(100)));
        assert_eq!(tables.messages().len(), 1);
        assert!(tables.is_banned(UserId(300)));
        assert_eq!(
            tables.statistics().bot_started.to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
    }

    #[test]
    fn failed_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.json");
        let mut store = Store::open_at(&path).unwrap();
        let before = store.tables().clone();

        // A directory in place of the snapshot makes the final rename fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let result = store.transact(|t| {
            t.register(UserId(1), None, "One".to_string());
            Ok::<_, StoreError>(())
        });

        assert!(result.is_err());
        assert_eq!(store.tables(), &before);
        assert!(path.is_dir());
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "x");
    }
}
