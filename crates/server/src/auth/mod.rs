//! Login gate for the relay.
//!
//! Every route is checked against a server-side auth session resolved from
//! a signed browser cookie; the login flows themselves (mock, Azure AD
//! authorization-code, manual token) live in `handlers`.

mod handlers;
pub mod sessions;
mod token;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::info;

use crate::state::AppState;

use sessions::AuthSession;

pub use handlers::{callback, login_page, login_post, logout, manual_token, store_tokens};

/// Routes reachable without a login session.
fn is_public(path: &str) -> bool {
    path == "/login"
        || path == "/health"
        || path.starts_with("/auth/")
        || path.starts_with("/docs")
}

/// Resolve the caller's auth session from the request cookie, if any.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<AuthSession> {
    let cookie = sessions::session_cookie(headers)?;
    state.auth_sessions.get(&cookie).await
}

/// Gate middleware: unauthenticated requests to non-public routes are
/// redirected to the login page, never served.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.auth.enabled {
        return next.run(request).await;
    }

    let path = request.uri().path();
    if is_public(path) {
        return next.run(request).await;
    }

    if current_session(&state, request.headers()).await.is_none() {
        info!(%path, "unauthenticated access attempt");
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
