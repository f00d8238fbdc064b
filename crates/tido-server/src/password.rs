//! Password hashing.
//!
//! Credentials are stored as Argon2id PHC strings with a fresh random salt
//! per password. Verification goes through the argon2 crate, which compares
//! digests in constant time.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};

/// Default time cost (iterations). Tunable via `TIDO_HASH_COST`.
pub const DEFAULT_COST: u32 = 3;
/// Memory cost is fixed at 19 MiB.
const MEMORY_KIB: u32 = 19_456;

fn hasher(cost: u32) -> Result<Argon2<'static>> {
    let params =
        Params::new(MEMORY_KIB, cost, 1, None).map_err(|e| anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash `password` with a fresh random salt, returning a PHC-format string.
pub fn hash(password: &str, cost: u32) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cost)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("argon2 hash: {e}"))?;
    Ok(hash.to_string())
}

/// Verify `password` against a stored PHC-format hash. The hash string
/// carries its own parameters and salt.
pub fn verify(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("stored hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
