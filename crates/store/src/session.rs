use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Role of a message in a transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Lenient parse for values read back from storage.
    pub fn parse(s: &str) -> Self {
        if s == "user" {
            Self::User
        } else {
            Self::Assistant
        }
    }
}

/// A single transcript entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, chart: Option<serde_json::Value>) -> Self {
        Self {
            role,
            content: content.into(),
            chart,
            timestamp: Utc::now(),
        }
    }
}

/// A conversation thread scoped to one agent and one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub created: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            created: Utc::now(),
            messages: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Sessions keyed by session id, preserving insertion order in JSON output.
pub type SessionMap = IndexMap<String, Session>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Transcript store shared by all relay endpoints.
///
/// Message lists are append-only: no reordering or mutation of history.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All sessions for `(agent, user)`; empty map when none exist.
    async fn list_sessions(&self, agent: &str, user_id: &str) -> Result<SessionMap, StoreError>;

    /// Idempotent upsert. Re-creating an existing session id keeps its
    /// creation time and transcript.
    async fn create_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError>;

    /// Remove a session and its messages. No-op when absent.
    async fn delete_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError>;

    /// Append a message, creating a skeleton session for unknown ids.
    async fn append_message(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
        message: Message,
    ) -> Result<(), StoreError>;
}
