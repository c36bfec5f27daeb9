//! Server-side auth sessions keyed by a signed browser cookie.
//!
//! The cookie value is `<id>.<hex hmac-sha256(id, secret)>`; the id is an
//! opaque uuid, so the MAC only prevents cookie forgery, it carries no
//! claims. Sessions live in process memory and die with it.

use std::collections::HashMap;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "relay_session";

type HmacSha256 = Hmac<Sha256>;

/// Profile and tokens carried by one login session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub display_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl AuthSession {
    /// Session for the mock/dev login path.
    pub fn test_user() -> Self {
        Self {
            display_name: "Test User".to_string(),
            name: "Test User".to_string(),
            email: None,
            oid: None,
            access_token: None,
            refresh_token: None,
            id_token: None,
        }
    }
}

/// In-memory session registry with HMAC-signed cookie values.
pub struct AuthSessions {
    secret: String,
    inner: RwLock<HashMap<String, AuthSession>>,
}

impl AuthSessions {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn sign(&self, id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Split and verify a cookie value, returning the session id.
    fn verify(&self, cookie_value: &str) -> Option<String> {
        let (id, signature) = cookie_value.split_once('.')?;
        if self.sign(id) == signature {
            Some(id.to_string())
        } else {
            debug!("session cookie signature mismatch");
            None
        }
    }

    /// Store a session and return the signed cookie value.
    pub async fn create(&self, session: AuthSession) -> String {
        let id = Uuid::new_v4().to_string();
        self.inner.write().await.insert(id.clone(), session);
        format!("{}.{}", id, self.sign(&id))
    }

    pub async fn get(&self, cookie_value: &str) -> Option<AuthSession> {
        let id = self.verify(cookie_value)?;
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, cookie_value: &str) -> Option<AuthSession> {
        let id = self.verify(cookie_value)?;
        self.inner.write().await.remove(&id)
    }
}

/// Pull the relay session cookie out of the request headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    for pair in raw.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(SESSION_COOKIE) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// `Set-Cookie` value establishing a session.
pub fn set_cookie_header(cookie_value: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, cookie_value
    )
}

/// `Set-Cookie` value clearing the session on logout.
pub fn clear_cookie_header() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}
