use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    auth::require_session,
    handlers::{
        create_item, dashboard_page, home, login, login_page, logout, register, register_page,
    },
    password, AppState,
};

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    /// Secret for signing session cookies ($TIDO_SESSION_SECRET).
    pub session_secret: Option<String>,
    /// Session lifetime in seconds. Defaults to 14 days.
    pub session_ttl_secs: i64,
    /// Argon2 time cost used when hashing new passwords.
    pub hash_cost: u32,
    pub sweep_interval: Duration,
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TIDO_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("TIDO_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_dir: std::env::var("TIDO_DATA_DIR").ok().map(PathBuf::from),
            session_secret: std::env::var("TIDO_SESSION_SECRET").ok(),
            session_ttl_secs: std::env::var("TIDO_SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_209_600),
            hash_cost: std::env::var("TIDO_HASH_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(password::DEFAULT_COST),
            sweep_interval: Duration::from_secs(300),
            cors_origins: std::env::var("TIDO_CORS_ORIGINS").ok(),
        }
    }
}

/// Read a secret from a file, trimming surrounding whitespace.
/// Fails if the file cannot be read or is empty after trimming.
pub fn read_key_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read key file: {}", path.display()))?;
    let key = content.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("key file is empty: {}", path.display());
    }
    Ok(key)
}

/// Resolve the cookie-signing secret from `TIDO_SESSION_SECRET_FILE`
/// (preferred) or the configured `TIDO_SESSION_SECRET`. File-based delivery
/// keeps the secret out of `docker inspect` and `/proc`.
pub fn resolve_session_secret(configured: Option<String>) -> Result<String> {
    if let Ok(path) = std::env::var("TIDO_SESSION_SECRET_FILE") {
        let secret = read_key_file(Path::new(&path))?;
        if configured.is_some() {
            warn!("both TIDO_SESSION_SECRET and TIDO_SESSION_SECRET_FILE are set; using file");
        }
        return Ok(secret);
    }
    configured
        .context("TIDO_SESSION_SECRET or TIDO_SESSION_SECRET_FILE environment variable is required")
}

/// Resolve the data directory, creating it if needed.
pub fn resolve_data_dir(data_dir: Option<&PathBuf>) -> Result<PathBuf> {
    match data_dir {
        Some(d) => {
            std::fs::create_dir_all(d).context("create data dir")?;
            Ok(d.clone())
        }
        None => crate::dirs::data_dir(),
    }
}

/// Build the application router. Split out of `run` so tests can drive the
/// service without binding a listener.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required).
    let public = Router::new()
        .route("/", get(home))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login));

    // Protected routes, gated by the session middleware.
    let protected = Router::new()
        .route("/dashboard", get(dashboard_page))
        .route("/logout", post(logout))
        .route("/create-item", post(create_item))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

pub async fn run(cfg: ServerConfig) -> Result<()> {
    let data_dir = resolve_data_dir(cfg.data_dir.as_ref())?;
    info!(data_dir = %data_dir.display(), "using data directory");

    let session_secret = resolve_session_secret(cfg.session_secret.clone())?;

    let db_path = data_dir.join("tido.db");
    let store = crate::store::Store::open(&db_path).context("open store")?;

    // Expired sessions are also lazily evicted on lookup; the sweep keeps
    // abandoned ones from accumulating.
    store.clone().spawn_sweep(cfg.sweep_interval);

    let state = AppState {
        store,
        session_secret,
        session_ttl_secs: cfg.session_ttl_secs,
        hash_cost: cfg.hash_cost,
    };

    let cors = build_cors(cfg.cors_origins.as_deref());
    let app = router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port")?;

    info!(%addr, "tido server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;

    axum::serve(listener, app).await.context("server error")
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match origins {
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            cors.allow_origin(origins)
        }
        None => cors.allow_origin(Any),
    }
}
