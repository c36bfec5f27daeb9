//! Login, OAuth callback, token storage, and logout handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::state::AppState;

use super::sessions::{clear_cookie_header, set_cookie_header, AuthSession};
use super::token::{decode_id_token, exchange_code_for_tokens, TokenSet, UserProfile};

fn attach_cookie(mut response: Response, cookie_header: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie_header) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

fn render_page(state: &AppState, name: &str, ctx: impl serde::Serialize) -> Response {
    match state.views.render(name, ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(template = %name, error = %e, "template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn session_from_tokens(profile: UserProfile, tokens: TokenSet) -> AuthSession {
    AuthSession {
        display_name: profile.display_name,
        name: profile.name,
        email: profile.email,
        oid: profile.oid,
        access_token: Some(tokens.access_token),
        refresh_token: tokens.refresh_token,
        id_token: tokens.id_token,
    }
}

// ── Login ─────────────────────────────────────────────────────────

/// `GET /login` — login page with the Azure authorize parameters templated in.
pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    let auth = &state.config.auth;
    render_page(
        &state,
        "login.html",
        json!({
            "authorize_url": auth.authorize_url(),
            "tenant_id": auth.tenant_id,
            "client_id": auth.client_id,
            "redirect_uri": auth.redirect_uri,
            "scope": auth.scopes,
        }),
    )
}

/// `POST /login` — mock login for development: unconditionally authenticates.
pub async fn login_post(State(state): State<Arc<AppState>>) -> Response {
    let cookie = state.auth_sessions.create(AuthSession::test_user()).await;
    info!("mock login");
    attach_cookie(
        Redirect::to("/").into_response(),
        &set_cookie_header(&cookie),
    )
}

// ── OAuth callback ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /auth/callback` — authorization-code leg of the Azure AD flow.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(err) = query.error {
        let description = query
            .error_description
            .unwrap_or_else(|| "No description provided".to_string());
        error!(error = %err, %description, "oauth callback error");
        return render_page(
            &state,
            "auth_error.html",
            json!({"error": err, "description": description}),
        );
    }

    let Some(code) = query.code else {
        error!("oauth callback without authorization code");
        return render_page(
            &state,
            "auth_error.html",
            json!({"error": "no_code", "description": "No authorization code received"}),
        );
    };

    match exchange_code_for_tokens(&state.http, &state.config.auth, &code).await {
        Ok(tokens) => render_page(
            &state,
            "auth_success.html",
            json!({
                "access_token": tokens.access_token,
                "refresh_token": tokens.refresh_token.clone().unwrap_or_default(),
                "id_token": tokens.id_token.clone().unwrap_or_default(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "token exchange failed");
            render_page(
                &state,
                "auth_error.html",
                json!({"error": "token_exchange_failed", "description": e.to_string()}),
            )
        }
    }
}

// ── Token storage ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StoreTokensRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
}

/// `POST /auth/store-tokens` — establish the session from tokens the
/// success page posted back.
pub async fn store_tokens(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StoreTokensRequest>,
) -> Response {
    let Some(access_token) = req.access_token.filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Access token is required"})),
        )
            .into_response();
    };

    let profile = decode_id_token(req.id_token.as_deref());
    info!(user = %profile.display_name, "storing tokens");

    let session = session_from_tokens(
        profile,
        TokenSet {
            access_token,
            refresh_token: req.refresh_token,
            id_token: req.id_token,
        },
    );
    let cookie = state.auth_sessions.create(session).await;

    attach_cookie(
        Json(json!({"success": true, "message": "Authentication successful"})).into_response(),
        &set_cookie_header(&cookie),
    )
}

#[derive(Deserialize)]
pub struct ManualTokenRequest {
    pub token: Option<String>,
}

/// `POST /auth/manual-token` — accept a pasted JWT for testing.
pub async fn manual_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManualTokenRequest>,
) -> Response {
    let Some(token) = req.token.filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Token is required"})),
        )
            .into_response();
    };

    // Shape check only: three dot-separated parts.
    if token.matches('.').count() != 2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid token format. Must be a valid JWT."})),
        )
            .into_response();
    }

    let profile = decode_id_token(Some(&token));
    info!(user = %profile.display_name, "manual token login");

    let session = session_from_tokens(
        profile,
        TokenSet {
            access_token: token,
            refresh_token: None,
            id_token: None,
        },
    );
    let cookie = state.auth_sessions.create(session).await;

    attach_cookie(
        Json(json!({"success": true, "message": "Manual token authentication successful"}))
            .into_response(),
        &set_cookie_header(&cookie),
    )
}

// ── Logout ────────────────────────────────────────────────────────

/// `GET /logout` — destroy the session and bounce to the login page.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(cookie) = super::sessions::session_cookie(&headers) {
        if let Some(session) = state.auth_sessions.remove(&cookie).await {
            info!(user = %session.display_name, "logged out");
        }
    }
    attach_cookie(
        Redirect::to("/login").into_response(),
        &clear_cookie_header(),
    )
}
