//! Relay API endpoints.
//!
//! Each sub-module owns one responsibility area; the shared error envelope
//! lives here in mod.rs.

mod agents;
mod chat;
pub mod doc;
mod health;
mod sessions;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use relay_adk::AdkError;
use relay_store::StoreError;

// ── Shared error envelope ────────────────────────────────────────

/// JSON error body returned by every relay endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    pub status: &'static str,
    pub message: String,
}

/// Relay error carrying the HTTP status to mirror back to the browser.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorEnvelope {
                status: "error",
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<AdkError> for ApiError {
    fn from(e: AdkError) -> Self {
        match e {
            AdkError::Timeout => Self {
                status: StatusCode::GATEWAY_TIMEOUT,
                message: "Request timed out".to_string(),
            },
            AdkError::Api { status, body } => Self {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message: format!("HTTP {}: {}", status, body),
            },
            AdkError::Http(e) => Self::internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::internal(e.to_string())
    }
}

// ── Re-exports ───────────────────────────────────────────────────

pub use agents::list_agents;
pub use chat::send_message;
pub use health::health;
pub use sessions::{sessions_create, sessions_delete, sessions_list};
