use anyhow::Result;
use redb::ReadableTable;
use tracing::debug;

use super::db::{decode, encode, Store, USERS, USERS_BY_EMAIL, USERS_BY_USERNAME};
use super::model::UserRecord;

/// Outcome of a registration attempt. Both index tables are checked and
/// written inside a single write transaction, so two racing registrations
/// with the same email or username cannot both succeed.
#[derive(Debug)]
pub enum CreateUserResult {
    Created(UserRecord),
    EmailTaken,
    UsernameTaken,
}

/// Generate a short random id for a user record.
pub fn generate_user_id() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

impl Store {
    /// Insert a new user, enforcing email and username uniqueness.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<CreateUserResult> {
        let write_txn = self.db.begin_write()?;
        let result = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;
            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;

            if by_email.get(email)?.is_some() {
                CreateUserResult::EmailTaken
            } else if by_username.get(username)?.is_some() {
                CreateUserResult::UsernameTaken
            } else {
                let record = UserRecord {
                    id: generate_user_id(),
                    name: name.to_owned(),
                    email: email.to_owned(),
                    username: username.to_owned(),
                    password_hash: password_hash.to_owned(),
                    created_at: Self::now(),
                };
                let bytes = encode(&record)?;
                users.insert(record.id.as_str(), bytes.as_slice())?;
                by_email.insert(email, record.id.as_str())?;
                by_username.insert(username, record.id.as_str())?;
                CreateUserResult::Created(record)
            }
        };
        write_txn.commit()?;

        if let CreateUserResult::Created(ref record) = result {
            debug!(user_id = %record.id, "created user");
        }
        Ok(result)
    }

    /// Exact-match lookup by email. Case-sensitive.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let by_email = read_txn.open_table(USERS_BY_EMAIL)?;
        let id = match by_email.get(email)? {
            Some(guard) => guard.value().to_owned(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id.as_str())? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Exact-match lookup by username. Case-sensitive.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let by_username = read_txn.open_table(USERS_BY_USERNAME)?;
        let id = match by_username.get(username)? {
            Some(guard) => guard.value().to_owned(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id.as_str())? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }
}
