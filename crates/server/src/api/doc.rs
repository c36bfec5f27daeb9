//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated relay handlers into a single
//! spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ADK Chat Relay API",
        version = "0.1.0",
        description = "Relay between the browser chat UI and a remote ADK agent service.",
    ),
    tags(
        (name = "Health", description = "Liveness and login-session status"),
        (name = "Agents", description = "Agent registry relayed from the ADK service"),
        (name = "Sessions", description = "Conversation threads and transcripts"),
        (name = "Chat", description = "Message relay with chart extraction"),
    ),
    paths(
        crate::api::health::health,
        crate::api::agents::list_agents,
        crate::api::sessions::sessions_list,
        crate::api::sessions::sessions_create,
        crate::api::sessions::sessions_delete,
        crate::api::chat::send_message,
    ),
    components(schemas(
        crate::api::ErrorEnvelope,
        crate::api::health::HealthResponse,
        crate::api::sessions::SessionRequest,
        crate::api::sessions::CreateSessionResponse,
        crate::api::sessions::DeleteSessionResponse,
        crate::api::chat::SendMessageRequest,
        crate::api::chat::SendMessageResponse,
    ))
)]
pub struct ApiDoc;
