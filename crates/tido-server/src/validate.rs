//! Request payload validation.
//!
//! Handlers hand the raw JSON body to these helpers before touching the
//! store, so shape errors never reach persistence. Checks fail fast on the
//! first violation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ApiError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// True if `value` looks like an email address. Also decides whether a
/// login id is matched against emails or usernames.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Login {
    pub login_id: String,
    pub password: String,
}

/// Pull a required string field out of a JSON body. Null and empty values
/// count as missing.
fn string_field<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ApiError::Validation(format!("{field} is required"))),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ApiError::Validation(format!("{field} is required")))
        }
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ApiError::Validation(format!("{field} must be a string"))),
    }
}

pub fn registration(body: &Value) -> Result<Registration, ApiError> {
    let name = string_field(body, "name")?;
    let email = string_field(body, "email")?;
    let username = string_field(body, "username")?;
    let password = string_field(body, "password")?;

    if !is_email(email) {
        return Err(ApiError::Validation("email is invalid".into()));
    }
    let username_len = username.chars().count();
    if !(3..=30).contains(&username_len) {
        return Err(ApiError::Validation(
            "username must be 3-30 characters".into(),
        ));
    }
    let password_len = password.chars().count();
    if !(6..=100).contains(&password_len) {
        return Err(ApiError::Validation(
            "password must be 6-100 characters".into(),
        ));
    }

    Ok(Registration {
        name: name.to_owned(),
        email: email.to_owned(),
        username: username.to_owned(),
        password: password.to_owned(),
    })
}

pub fn login(body: &Value) -> Result<Login, ApiError> {
    let login_id = string_field(body, "loginId")?;
    let password = string_field(body, "password")?;
    Ok(Login {
        login_id: login_id.to_owned(),
        password: password.to_owned(),
    })
}

pub fn todo_text(body: &Value) -> Result<String, ApiError> {
    let text = string_field(body, "todo")?;
    let len = text.chars().count();
    if !(3..=100).contains(&len) {
        return Err(ApiError::Validation("todo must be 3-100 characters".into()));
    }
    Ok(text.to_owned())
}
