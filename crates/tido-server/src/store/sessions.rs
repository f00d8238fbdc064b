use anyhow::Result;
use redb::ReadableTable;
use tracing::debug;

use super::db::{decode, encode, Store, SESSIONS};
use super::model::{SessionRecord, UserProfile};

/// Generate a new random session id (32 hex chars).
pub fn generate_session_id() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

impl Store {
    /// Create an authenticated session for `user` and return its id.
    pub fn create_session(&self, user: UserProfile, ttl_secs: i64) -> Result<String> {
        let sid = generate_session_id();
        let now = Self::now();
        let record = SessionRecord {
            authenticated: true,
            user,
            created_at: now,
            expires_at: now + ttl_secs,
        };
        let bytes = encode(&record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            table.insert(sid.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        debug!(sid = %sid, "created session");
        Ok(sid)
    }

    /// Look up a session by id, lazily evicting it if expired.
    pub fn get_session(&self, sid: &str) -> Result<Option<SessionRecord>> {
        let now = Self::now();

        let write_txn = self.db.begin_write()?;
        let result = {
            let mut table = write_txn.open_table(SESSIONS)?;

            // Clone the raw bytes so the AccessGuard (which borrows `table`)
            // is dropped before any mutation.
            let raw: Option<Vec<u8>> = table.get(sid)?.map(|guard| guard.value().to_vec());

            match raw {
                None => None,
                Some(bytes) => {
                    let record: SessionRecord = decode(&bytes)?;
                    if record.is_expired(now) {
                        table.remove(sid)?;
                        debug!(sid = %sid, "lazy-evicted expired session");
                        None
                    } else {
                        Some(record)
                    }
                }
            }
        };
        write_txn.commit()?;
        Ok(result)
    }

    /// Destroy a session by id. Returns true if it existed.
    pub fn destroy_session(&self, sid: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let existed = table.remove(sid)?.is_some();
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Remove every expired session. Returns how many were evicted.
    pub fn sweep_expired_sessions(&self) -> Result<usize> {
        let now = Self::now();
        let write_txn = self.db.begin_write()?;
        let count = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let mut expired = Vec::new();
            for item in table.iter()? {
                let (k, v) = item?;
                let record: SessionRecord = decode(v.value())?;
                if record.is_expired(now) {
                    expired.push(k.value().to_owned());
                }
            }
            for sid in &expired {
                table.remove(sid.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(count)
    }
}
