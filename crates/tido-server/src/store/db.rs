use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use redb::{Database, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time;
use tracing::{info, warn};

/// User records, keyed by user id.
pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// email -> user id. Probed and written in the same transaction as the
/// record, so uniqueness holds under concurrent registration.
pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, &str> =
    TableDefinition::new("users_by_email");
/// username -> user id.
pub(crate) const USERS_BY_USERNAME: TableDefinition<&str, &str> =
    TableDefinition::new("users_by_username");
/// Todo records, keyed by sequence id.
pub(crate) const TODOS: TableDefinition<u64, &[u8]> = TableDefinition::new("todos");
/// Session records, keyed by session id.
pub(crate) const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
pub(crate) const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");
pub(crate) const TODO_SEQ_KEY: &str = "todo_seq";

/// Thread-safe handle to the redb store.
#[derive(Clone)]
pub struct Store {
    pub(crate) db: Arc<Database>,
}

impl Store {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).context("open redb database")?;

        // Ensure all tables exist.
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS)?;
        write_txn.open_table(USERS_BY_EMAIL)?;
        write_txn.open_table(USERS_BY_USERNAME)?;
        write_txn.open_table(TODOS)?;
        write_txn.open_table(SESSIONS)?;
        write_txn.open_table(COUNTERS)?;
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Spawn a background task that evicts expired sessions every `interval`.
    pub fn spawn_sweep(self, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            loop {
                ticker.tick().await;
                match self.sweep_expired_sessions() {
                    Ok(0) => {}
                    Ok(count) => info!(count, "swept expired sessions"),
                    Err(e) => warn!(error = %e, "session sweep failed"),
                }
            }
        });
    }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard()).context("bincode encode")
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .context("bincode decode")?;
    Ok(value)
}
