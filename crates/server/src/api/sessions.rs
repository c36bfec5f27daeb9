//! Session CRUD: list from the transcript store, create/delete relayed to
//! the ADK service before the local store is touched.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use relay_adk::AdkError;
use relay_store::SessionMap;

use crate::state::AppState;

use super::{ApiError, ErrorEnvelope};

#[derive(Deserialize, ToSchema)]
pub struct SessionsQuery {
    pub agent: String,
    pub user: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub agent: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub status: &'static str,
    pub session_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteSessionResponse {
    pub status: &'static str,
}

/// List sessions
///
/// Returns the transcript map for one agent/user pair, keyed by session id.
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    params(
        ("agent" = String, Query, description = "Agent name"),
        ("user" = String, Query, description = "Browser user id")
    ),
    responses(
        (status = 200, description = "Sessions keyed by id", body = Object),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
pub async fn sessions_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<SessionMap>, ApiError> {
    let sessions = state.store.list_sessions(&query.agent, &query.user).await?;
    Ok(Json(sessions))
}

/// Create a session
///
/// Registers the session with the ADK service, then upserts it locally.
/// Re-creating an existing id preserves its transcript.
#[utoipa::path(
    post,
    path = "/api/create-session",
    tag = "Sessions",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse),
        (status = 500, description = "Relay or store failure", body = ErrorEnvelope)
    )
)]
pub async fn sessions_create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    info!(agent = %req.agent, session = %req.session_id, "creating session");
    state
        .adk
        .create_session(&req.agent, &req.user_id, &req.session_id)
        .await?;
    state
        .store
        .create_session(&req.agent, &req.user_id, &req.session_id)
        .await?;
    Ok(Json(CreateSessionResponse {
        status: "success",
        session_id: req.session_id,
    }))
}

/// Delete a session
///
/// Removes the session upstream (failures there are logged, not fatal) and
/// from the local store. Deleting an unknown session is a no-op.
#[utoipa::path(
    delete,
    path = "/api/delete-session",
    tag = "Sessions",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session deleted", body = DeleteSessionResponse),
        (status = 500, description = "Relay or store failure", body = ErrorEnvelope)
    )
)]
pub async fn sessions_delete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<DeleteSessionResponse>, ApiError> {
    info!(agent = %req.agent, session = %req.session_id, "deleting session");
    match state
        .adk
        .delete_session(&req.agent, &req.user_id, &req.session_id)
        .await
    {
        Ok(()) => {}
        // The upstream copy may already be gone; the local transcript still
        // has to go.
        Err(AdkError::Api { status, .. }) => {
            warn!(status, session = %req.session_id, "upstream delete failed, removing local copy");
        }
        Err(e) => return Err(e.into()),
    }
    state
        .store
        .delete_session(&req.agent, &req.user_id, &req.session_id)
        .await?;
    Ok(Json(DeleteSessionResponse { status: "success" }))
}
