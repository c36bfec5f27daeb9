//! In-memory session store for single-instance deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::session::{Message, Session, SessionMap, SessionStore, StoreError};

fn user_key(agent: &str, user_id: &str) -> String {
    format!("{}:{}", agent, user_id)
}

/// Process-local map of `agent:user` → ordered session map.
///
/// State lives only as long as the process; every relay endpoint shares one
/// instance through `Arc<dyn SessionStore>`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, SessionMap>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn list_sessions(&self, agent: &str, user_id: &str) -> Result<SessionMap, StoreError> {
        let inner = self.inner.read().await;
        let sessions = inner.get(&user_key(agent, user_id)).cloned().unwrap_or_default();
        debug!(agent, user_id, count = sessions.len(), "listed sessions");
        Ok(sessions)
    }

    async fn create_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .entry(user_key(agent, user_id))
            .or_default()
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        Ok(())
    }

    async fn delete_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(sessions) = inner.get_mut(&user_key(agent, user_id)) {
            sessions.shift_remove(session_id);
        }
        Ok(())
    }

    async fn append_message(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
        message: Message,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .entry(user_key(agent, user_id))
            .or_default()
            .entry(session_id.to_string())
            .or_insert_with(Session::new)
            .messages
            .push(message);
        Ok(())
    }
}
