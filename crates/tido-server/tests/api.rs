use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use tido_server::{server::router, store::Store, AppState};

const SECRET: &str = "keyboard cat";

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("test.db")).unwrap();
    let state = AppState {
        store,
        session_secret: SECRET.into(),
        session_ttl_secs: 3600,
        // Lowest time cost keeps the hashing tests fast.
        hash_cost: 1,
    };
    (router(state), dir)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` pair from a response's Set-Cookie header, suitable for
/// sending back in a Cookie header.
fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn alice() -> Value {
    json!({
        "name": "A",
        "email": "a@x.com",
        "username": "alice",
        "password": "secret1",
    })
}

async fn register_alice(app: &Router) {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/register", alice()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

async fn login_alice(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({"loginId": "a@x.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    session_cookie(&resp)
}

// --- public surface ---

#[tokio::test]
async fn home_is_public() {
    let (app, _dir) = test_app();
    let resp = app.oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"server is running");
}

#[tokio::test]
async fn form_pages_render() {
    let (app, _dir) = test_app();
    for uri in ["/register", "/login"] {
        let resp = app.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

// --- register ---

#[tokio::test]
async fn register_redirects_to_login() {
    let (app, _dir) = test_app();
    let resp = app
        .oneshot(json_request("POST", "/register", alice()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn register_missing_field_writes_nothing() {
    let (app, _dir) = test_app();
    for field in ["name", "email", "username", "password"] {
        let mut body = alice();
        body.as_object_mut().unwrap().remove(field);
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/register", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "missing {field}");
    }
    // None of the rejected attempts persisted anything: the full payload
    // still registers without a conflict.
    register_alice(&app).await;
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let (app, _dir) = test_app();
    register_alice(&app).await;

    // Same email, different username.
    let mut body = alice();
    body["username"] = json!("alice2");
    let resp = app
        .oneshot(json_request("POST", "/register", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "email already registered");
}

#[tokio::test]
async fn register_duplicate_username_conflicts() {
    let (app, _dir) = test_app();
    register_alice(&app).await;

    let mut body = alice();
    body["email"] = json!("a2@x.com");
    let resp = app
        .oneshot(json_request("POST", "/register", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "username already taken");
}

#[tokio::test]
async fn register_rejects_bad_shapes() {
    let (app, _dir) = test_app();
    let cases = [
        ("email", json!("not-an-email")),
        ("username", json!("ab")),
        ("password", json!("short")),
        ("name", json!(7)),
    ];
    for (field, value) in cases {
        let mut body = alice();
        body[field] = value;
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/register", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "bad {field}");
    }
}

// --- login ---

#[tokio::test]
async fn login_unknown_user_fails() {
    let (app, _dir) = test_app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/login",
            json!({"loginId": "ghost", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "user not found, register first");
}

#[tokio::test]
async fn login_wrong_password_fails() {
    let (app, _dir) = test_app();
    register_alice(&app).await;
    let resp = app
        .oneshot(json_request(
            "POST",
            "/login",
            json!({"loginId": "alice", "password": "secret2"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "incorrect password");
}

#[tokio::test]
async fn login_by_username_works() {
    let (app, _dir) = test_app();
    register_alice(&app).await;
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({"loginId": "alice", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/dashboard");

    let cookie = session_cookie(&resp);
    let resp = app
        .oneshot(get_request("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- session lifecycle ---

#[tokio::test]
async fn full_session_lifecycle() {
    let (app, _dir) = test_app();

    // Register → 201 → redirect target /login.
    register_alice(&app).await;

    // Dashboard is gated until login.
    let resp = app
        .clone()
        .oneshot(get_request("/dashboard", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Login by email → session established.
    let cookie = login_alice(&app).await;

    let resp = app
        .clone()
        .oneshot(get_request("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Logout destroys the session.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "logout successful");

    // The old cookie no longer opens the dashboard.
    let resp = app
        .oneshot(get_request("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_cookie_rejected() {
    let (app, _dir) = test_app();
    register_alice(&app).await;
    let cookie = login_alice(&app).await;

    // Prepend a character to the session id; the signature no longer matches.
    let tampered = cookie.replace("=s:", "=s:f");
    assert_ne!(cookie, tampered);
    let resp = app
        .oneshot(get_request("/dashboard", Some(&tampered)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_requires_session() {
    let (app, _dir) = test_app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- create-item ---

#[tokio::test]
async fn create_item_requires_auth() {
    let (app, _dir) = test_app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/create-item",
            json!({"todo": "buy milk"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_item_returns_record() {
    let (app, _dir) = test_app();
    register_alice(&app).await;
    let cookie = login_alice(&app).await;

    let mut req = json_request("POST", "/create-item", json!({"todo": "buy milk"}));
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    assert_eq!(body["message"], "todo created");
    assert_eq!(body["todo"]["todo"], "buy milk");
    assert_eq!(body["todo"]["id"], 1);
}

#[tokio::test]
async fn create_item_length_boundaries() {
    let (app, _dir) = test_app();
    register_alice(&app).await;
    let cookie = login_alice(&app).await;

    let cases = [
        ("ab".to_string(), StatusCode::BAD_REQUEST),
        ("abc".to_string(), StatusCode::CREATED),
        ("x".repeat(100), StatusCode::CREATED),
        ("x".repeat(101), StatusCode::BAD_REQUEST),
    ];
    for (todo, expected) in cases {
        let len = todo.len();
        let mut req = json_request("POST", "/create-item", json!({"todo": todo}));
        req.headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), expected, "todo of length {len}");
    }
}
