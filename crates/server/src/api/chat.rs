//! The message relay: store the user turn, forward to the agent, extract
//! any embedded chart, store the assistant turn, return both to the browser.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use relay_adk::extract_chart;
use relay_store::{Message, Role};

use crate::state::AppState;

use super::{ApiError, ErrorEnvelope};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub agent: String,
    pub user_id: String,
    pub session_id: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub status: &'static str,
    pub response: String,
    /// Plotly document extracted from the assistant text, if any.
    #[schema(value_type = Object)]
    pub chart: Option<serde_json::Value>,
}

/// Send a message
///
/// Relays one user message through the ADK `/run` endpoint and returns the
/// assistant text plus an optional chart document.
#[utoipa::path(
    post,
    path = "/api/send-message",
    tag = "Chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = SendMessageResponse),
        (status = 504, description = "Agent run timed out", body = ErrorEnvelope),
        (status = 500, description = "Relay or store failure", body = ErrorEnvelope)
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    info!(agent = %req.agent, session = %req.session_id, "relaying message");

    state
        .store
        .append_message(
            &req.agent,
            &req.user_id,
            &req.session_id,
            Message::new(Role::User, req.message.clone(), None),
        )
        .await?;

    let raw = state
        .adk
        .run(&req.agent, &req.user_id, &req.session_id, &req.message)
        .await?;

    let (response, chart) = extract_chart(&raw);

    state
        .store
        .append_message(
            &req.agent,
            &req.user_id,
            &req.session_id,
            Message::new(Role::Assistant, response.clone(), chart.clone()),
        )
        .await?;

    Ok(Json(SendMessageResponse {
        status: "success",
        response,
        chart,
    }))
}
