//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub authenticated: bool,
}

/// Health check
///
/// Public liveness probe; also reports whether the caller holds a login session.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<HealthResponse> {
    let authenticated = auth::current_session(&state, &headers).await.is_some();
    Json(HealthResponse {
        status: "healthy",
        authenticated,
    })
}
