pub mod auth;
pub mod dirs;
pub mod error;
pub mod handlers;
pub mod password;
pub mod server;
pub mod session;
pub mod store;
pub mod validate;

/// Shared application state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: store::Store,
    /// Secret used to sign session cookies.
    pub session_secret: String,
    /// Lifetime of a session record, in seconds.
    pub session_ttl_secs: i64,
    /// Argon2 time cost applied when hashing new passwords.
    pub hash_cost: u32,
}

pub use server::{read_key_file, resolve_data_dir, run, ServerConfig};
