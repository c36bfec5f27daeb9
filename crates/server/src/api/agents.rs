//! Agent listing relayed from the ADK service.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::state::AppState;

use super::{ApiError, ErrorEnvelope};

/// List available agents
///
/// Relays the ADK service's `/list-apps` registry.
#[utoipa::path(
    get,
    path = "/api/list-agents",
    tag = "Agents",
    responses(
        (status = 200, description = "Agent names", body = Vec<String>),
        (status = 500, description = "Relay failure", body = ErrorEnvelope)
    )
)]
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    info!(base = %state.adk.base_url(), "fetching agent list");
    let agents = state.adk.list_apps().await?;
    info!(count = agents.len(), "fetched agents");
    Ok(Json(agents))
}
