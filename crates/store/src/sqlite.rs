//! SQLite-backed session store.
//!
//! Single-writer durability for development deployments that should survive
//! restarts. Two tables: `sessions` (one row per thread, unique on
//! agent/user/session) and `messages` (append-only, keyed by the composite
//! `agent:user:session` string).

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, warn};

use crate::session::{Message, Role, Session, SessionMap, SessionStore, StoreError};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        agent TEXT NOT NULL,
        user_id TEXT NOT NULL,
        session_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE(agent, user_id, session_id)
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_key TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        chart TEXT,
        timestamp TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_session_key ON messages(session_key)",
];

fn session_key(agent: &str, user_id: &str, session_id: &str) -> String {
    format!("{}:{}:{}", agent, user_id, session_id)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|_| {
        warn!(%raw, "unparseable stored timestamp, substituting now");
        Utc::now()
    })
}

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    ///
    /// WAL journal mode and a busy timeout keep the single-writer model
    /// usable when requests overlap.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
            .map_err(StoreError::from)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!(path = %path.display(), "sqlite session store opened");
        Ok(store)
    }

    /// In-memory database (for tests).
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(StoreError::from)?;
        // One connection only — each :memory: connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Upsert the session row, touching `updated_at` but never `created_at`.
    async fn upsert_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO sessions (agent, user_id, session_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(agent, user_id, session_id)
             DO UPDATE SET updated_at = excluded.updated_at",
        )
        .bind(agent)
        .bind(user_id)
        .bind(session_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn list_sessions(&self, agent: &str, user_id: &str) -> Result<SessionMap, StoreError> {
        let rows = sqlx::query(
            "SELECT session_id, created_at FROM sessions
             WHERE agent = ?1 AND user_id = ?2
             ORDER BY id",
        )
        .bind(agent)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = SessionMap::new();
        for row in rows {
            let session_id: String = row.try_get("session_id")?;
            let created_at: String = row.try_get("created_at")?;

            let message_rows = sqlx::query(
                "SELECT role, content, chart, timestamp FROM messages
                 WHERE session_key = ?1
                 ORDER BY id",
            )
            .bind(session_key(agent, user_id, &session_id))
            .fetch_all(&self.pool)
            .await?;

            let mut messages = Vec::with_capacity(message_rows.len());
            for m in message_rows {
                let role: String = m.try_get("role")?;
                let chart: Option<String> = m.try_get("chart")?;
                let timestamp: String = m.try_get("timestamp")?;
                messages.push(Message {
                    role: Role::parse(&role),
                    content: m.try_get("content")?,
                    chart: chart.as_deref().map(serde_json::from_str).transpose()?,
                    timestamp: parse_timestamp(&timestamp),
                });
            }

            sessions.insert(
                session_id,
                Session {
                    created: parse_timestamp(&created_at),
                    messages,
                },
            );
        }
        Ok(sessions)
    }

    async fn create_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError> {
        self.upsert_session(agent, user_id, session_id).await
    }

    async fn delete_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM messages WHERE session_key = ?1")
            .bind(session_key(agent, user_id, session_id))
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "DELETE FROM sessions WHERE agent = ?1 AND user_id = ?2 AND session_id = ?3",
        )
        .bind(agent)
        .bind(user_id)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_message(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
        message: Message,
    ) -> Result<(), StoreError> {
        self.upsert_session(agent, user_id, session_id).await?;

        let chart = message
            .chart
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO messages (session_key, role, content, chart, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(session_key(agent, user_id, session_id))
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(chart)
        .bind(message.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
