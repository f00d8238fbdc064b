use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    auth::SessionContext,
    error::ApiError,
    password, session,
    store::CreateUserResult,
    validate, AppState,
};

// ── Pages ────────────────────────────────────────────────────────────────────

const REGISTER_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Tido — Register</title></head>
<body>
  <h1>Register</h1>
  <form id="register-form">
    <input name="name" placeholder="Name" required>
    <input name="email" type="email" placeholder="Email" required>
    <input name="username" placeholder="Username" required>
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Register</button>
  </form>
  <p id="status"></p>
  <script>
    document.getElementById('register-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(e.target));
      const res = await fetch('/register', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify(body),
      });
      if (res.status === 201) { window.location = '/login'; return; }
      const data = await res.json();
      document.getElementById('status').textContent = data.error || 'registration failed';
    });
  </script>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Tido — Login</title></head>
<body>
  <h1>Login</h1>
  <form id="login-form">
    <input name="loginId" placeholder="Email or username" required>
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Login</button>
  </form>
  <p id="status"></p>
  <script>
    document.getElementById('login-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(e.target));
      const res = await fetch('/login', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify(body),
        redirect: 'follow',
      });
      if (res.redirected || res.ok) { window.location = '/dashboard'; return; }
      const data = await res.json();
      document.getElementById('status').textContent = data.error || 'login failed';
    });
  </script>
</body>
</html>
"#;

const DASHBOARD_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Tido — Dashboard</title></head>
<body>
  <h1>Dashboard</h1>
  <form id="todo-form">
    <input name="todo" placeholder="What needs doing? (3-100 chars)" required>
    <button type="submit">Add</button>
  </form>
  <button id="logout">Logout</button>
  <p id="status"></p>
  <script>
    document.getElementById('todo-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const body = Object.fromEntries(new FormData(e.target));
      const res = await fetch('/create-item', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify(body),
      });
      const data = await res.json();
      document.getElementById('status').textContent =
        res.status === 201 ? 'created todo #' + data.todo.id : (data.error || 'failed');
      if (res.status === 201) e.target.reset();
    });
    document.getElementById('logout').addEventListener('click', async () => {
      await fetch('/logout', {method: 'POST'});
      window.location = '/login';
    });
  </script>
</body>
</html>
"#;

pub async fn home() -> &'static str {
    "server is running"
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn dashboard_page(Extension(_ctx): Extension<SessionContext>) -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

// ── Register ─────────────────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let reg = validate::registration(&body)?;

    let password_hash = password::hash(&reg.password, state.hash_cost)?;

    match state
        .store
        .create_user(&reg.name, &reg.email, &reg.username, &password_hash)?
    {
        CreateUserResult::EmailTaken => Err(ApiError::Conflict("email already registered".into())),
        CreateUserResult::UsernameTaken => {
            Err(ApiError::Conflict("username already taken".into()))
        }
        CreateUserResult::Created(user) => {
            info!(user_id = %user.id, username = %user.username, "registered user");
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, "/login")],
                Json(json!({"message": "user registered", "next": "/login"})),
            )
                .into_response())
        }
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let creds = validate::login(&body)?;

    // A login id shaped like an email is matched against emails, anything
    // else against usernames. Exact match, case-sensitive.
    let user = if validate::is_email(&creds.login_id) {
        state.store.find_user_by_email(&creds.login_id)?
    } else {
        state.store.find_user_by_username(&creds.login_id)?
    };
    let Some(user) = user else {
        return Err(ApiError::NotFound("user not found, register first".into()));
    };

    if !password::verify(&creds.password, &user.password_hash)? {
        return Err(ApiError::WrongPassword);
    }

    // The session stores only the non-sensitive projection.
    let sid = state
        .store
        .create_session(user.profile(), state.session_ttl_secs)?;
    let cookie = session::set_cookie(
        &session::sign(&sid, &state.session_secret),
        state.session_ttl_secs,
    );

    info!(user_id = %user.id, "login successful");
    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/dashboard".to_string()),
        ],
    )
        .into_response())
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Response, ApiError> {
    // The whole record is destroyed, not just the auth flag.
    state.store.destroy_session(&ctx.sid)?;

    info!(user_id = %ctx.user.user_id, "logout successful");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session::clear_cookie())],
        Json(json!({"message": "logout successful"})),
    )
        .into_response())
}

// ── Todos ────────────────────────────────────────────────────────────────────

pub async fn create_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let text = validate::todo_text(&body)?;

    let todo = state.store.create_todo(&text, &ctx.user.user_id)?;

    info!(todo_id = todo.id, user_id = %ctx.user.user_id, "created todo");
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "todo created", "todo": todo})),
    )
        .into_response())
}
