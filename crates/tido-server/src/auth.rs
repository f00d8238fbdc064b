use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, session, store::UserProfile, AppState};

/// Identity attached to a request once its session checks out.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub sid: String,
    pub user: UserProfile,
}

/// Axum middleware gating protected routes behind an authenticated session.
///
/// Reads the session cookie, verifies its signature, and loads the record
/// from the store. The downstream handler only runs when the record exists
/// and is marked authenticated; it receives the identity as a request
/// extension. Session state is inspected, never mutated.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let sid = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session::cookie_from_header)
        .and_then(|raw| session::unsign(raw, &state.session_secret));

    let Some(sid) = sid else {
        return ApiError::Unauthorized.into_response();
    };

    let record = match state.store.get_session(&sid) {
        Ok(Some(record)) if record.authenticated => record,
        // Missing, expired, or unauthenticated sessions all read as anonymous.
        Ok(_) => return ApiError::Unauthorized.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            return ApiError::Unauthorized.into_response();
        }
    };

    request.extensions_mut().insert(SessionContext {
        sid,
        user: record.user,
    });
    next.run(request).await
}
