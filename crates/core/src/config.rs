use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_opt(key).as_deref() {
        Some("true") | Some("1") | Some("yes") => true,
        Some("false") | Some("0") | Some("no") => false,
        _ => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub adk: AdkConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            adk: AdkConfig::from_env(),
            store: StoreConfig::from_env(),
            auth: AuthConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:  {}:{}", self.server.host, self.server.port);
        tracing::info!("  adk:     base_url={}", self.adk.base_url);
        tracing::info!(
            "  store:   backend={}, db_path={}",
            self.store.backend,
            self.store.db_path.display()
        );
        tracing::info!(
            "  auth:    enabled={}, tenant={}, client={}, secret_set={}",
            self.auth.enabled,
            self.auth.tenant_id,
            self.auth.client_id,
            self.auth.client_secret.is_some()
        );
        tracing::info!("  auth:    redirect_uri={}", self.auth.redirect_uri);
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Key used to sign the browser session cookie.
    pub secret_key: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 5000),
            secret_key: env_or("SECRET_KEY", "dev-secret-change-in-production"),
        }
    }
}

// ── ADK agent service ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdkConfig {
    pub base_url: String,
}

impl AdkConfig {
    fn from_env() -> Self {
        let mut base_url = env_or("ADK_API_BASE", "http://localhost:8000");
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

// ── Transcript store ──────────────────────────────────────────

/// Which session store backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub db_path: PathBuf,
}

impl StoreConfig {
    fn from_env() -> Self {
        let backend = match env_or("STORE_BACKEND", "memory").to_lowercase().as_str() {
            "sqlite" => StoreBackend::Sqlite,
            other => {
                if other != "memory" {
                    tracing::warn!(backend = %other, "unknown STORE_BACKEND, using memory");
                }
                StoreBackend::Memory
            }
        };
        Self {
            backend,
            db_path: PathBuf::from(env_or("DB_PATH", "adk_chat_sessions.db")),
        }
    }
}

// ── Azure AD OAuth ────────────────────────────────────────────

const DEFAULT_TENANT_ID: &str = "6ba231bb-ad9e-41b9-b23d-674c80196bbd";
const DEFAULT_CLIENT_ID: &str = "11ddc0cd-e6fc-48b6-8832-de61800fb41e";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When false, every route is reachable without a login session.
    pub enabled: bool,
    pub tenant_id: String,
    pub client_id: String,
    /// Empty for public clients.
    pub client_secret: Option<String>,
    pub scopes: String,
    pub redirect_uri: String,
}

impl AuthConfig {
    fn from_env() -> Self {
        let client_id = env_or("AZURE_CLIENT_ID", DEFAULT_CLIENT_ID);
        let scopes = env_or(
            "AZURE_SCOPES",
            &format!("openid api://{}/mcp.access", client_id),
        );
        Self {
            enabled: env_bool("AUTH_ENABLED", true),
            tenant_id: env_or("AZURE_TENANT_ID", DEFAULT_TENANT_ID),
            client_id,
            client_secret: env_opt("AZURE_CLIENT_SECRET"),
            scopes,
            redirect_uri: env_or("REDIRECT_URI", "http://localhost:5000/auth/callback"),
        }
    }

    /// Identity-provider token endpoint for the authorization-code exchange.
    pub fn token_url(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant_id
        )
    }

    /// Identity-provider authorize endpoint the login page sends the browser to.
    pub fn authorize_url(&self) -> String {
        format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize",
            self.tenant_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_sqlite() {
        std::env::set_var("STORE_BACKEND", "sqlite");
        std::env::set_var("DB_PATH", "/tmp/relay-test.db");
        let store = StoreConfig::from_env();
        assert_eq!(store.backend, StoreBackend::Sqlite);
        assert_eq!(store.db_path, PathBuf::from("/tmp/relay-test.db"));
        std::env::remove_var("STORE_BACKEND");
        std::env::remove_var("DB_PATH");
    }

    #[test]
    fn adk_base_url_strips_trailing_slash() {
        std::env::set_var("ADK_API_BASE", "http://agents:8070///");
        let adk = AdkConfig::from_env();
        assert_eq!(adk.base_url, "http://agents:8070");
        std::env::remove_var("ADK_API_BASE");
    }

    #[test]
    fn token_url_uses_tenant() {
        let auth = AuthConfig {
            enabled: true,
            tenant_id: "my-tenant".to_string(),
            client_id: "my-client".to_string(),
            client_secret: None,
            scopes: "openid".to_string(),
            redirect_uri: "http://localhost:5000/auth/callback".to_string(),
        };
        assert_eq!(
            auth.token_url(),
            "https://login.microsoftonline.com/my-tenant/oauth2/v2.0/token"
        );
    }
}
