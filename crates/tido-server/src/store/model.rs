use serde::{Deserialize, Serialize};

/// Stored in redb as bincode-encoded bytes. The password exists only as an
/// Argon2 PHC hash; plaintext never reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    /// Unix timestamp (seconds) when the account was created.
    pub created_at: i64,
}

impl UserRecord {
    /// The non-sensitive projection placed in sessions and responses.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// What a session (and any response body) is allowed to know about a user.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: u64,
    pub todo: String,
    /// Id of the user who created the item.
    pub owner: String,
    pub created_at: i64,
}

/// Server-side session state, keyed by the cookie's session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The sole authorization signal for protected routes.
    pub authenticated: bool,
    pub user: UserProfile,
    pub created_at: i64,
    /// Unix timestamp (seconds) after which the session is dead.
    pub expires_at: i64,
}

impl SessionRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}
