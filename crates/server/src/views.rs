//! HTML views rendered with minijinja.
//!
//! Templates are compiled in at build time; one template per page replaces
//! the repeated inline HTML blocks of earlier iterations of this UI.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use minijinja::Environment;
use serde_json::json;
use tracing::error;

use crate::auth;
use crate::state::AppState;

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("chat.html", include_str!("../templates/chat.html"))?;
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        env.add_template(
            "auth_success.html",
            include_str!("../templates/auth_success.html"),
        )?;
        env.add_template(
            "auth_error.html",
            include_str!("../templates/auth_error.html"),
        )?;
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: impl serde::Serialize) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

/// `GET /` — the chat UI for authenticated callers.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = auth::current_session(&state, &headers).await;
    if state.config.auth.enabled && session.is_none() {
        return Redirect::to("/login").into_response();
    }

    let display_name = session.map(|s| s.display_name).unwrap_or_default();
    match state.views.render(
        "chat.html",
        json!({
            "user": display_name,
            "auth_enabled": state.config.auth.enabled,
        }),
    ) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "chat template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
