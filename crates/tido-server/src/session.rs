//! Session cookie plumbing.
//!
//! The cookie carries only an opaque session id, signed with HMAC-SHA256 in
//! the express-session wire shape `s:<id>.<base64 signature>`. All session
//! state lives server-side in the store; a client can neither read nor forge
//! a session from the cookie alone.

use base64::{engine::general_purpose::STANDARD, Engine};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const COOKIE_NAME: &str = "tido.sid";

type HmacSha256 = Hmac<Sha256>;

fn signature(value: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(value.as_bytes());
    // Base64 without trailing padding, matching cookie-signature output.
    STANDARD
        .encode(mac.finalize().into_bytes())
        .trim_end_matches('=')
        .to_string()
}

/// Sign a session id for transport in a cookie.
pub fn sign(sid: &str, secret: &str) -> String {
    format!("s:{sid}.{}", signature(sid, secret))
}

/// Recover a session id from a signed cookie value. Returns `None` when the
/// prefix is missing or the signature does not match.
pub fn unsign(cookie_value: &str, secret: &str) -> Option<String> {
    let rest = cookie_value.strip_prefix("s:")?;
    let dot = rest.rfind('.')?;
    let (sid, provided) = (&rest[..dot], &rest[dot + 1..]);
    let expected = signature(sid, secret);
    constant_time_eq(expected.as_bytes(), provided.as_bytes()).then(|| sid.to_string())
}

/// Extract this application's cookie value from a `Cookie` header.
pub fn cookie_from_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME).then_some(value)
    })
}

/// Build the `Set-Cookie` value installing a signed session cookie.
pub fn set_cookie(signed: &str, max_age_secs: i64) -> String {
    format!("{COOKIE_NAME}={signed}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build the `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
