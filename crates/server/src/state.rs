use std::sync::Arc;

use relay_adk::AdkClient;
use relay_core::Config;
use relay_store::SessionStore;

use crate::auth::sessions::AuthSessions;
use crate::views::Views;

pub struct AppState {
    pub config: Config,
    pub adk: AdkClient,
    pub store: Arc<dyn SessionStore>,
    pub auth_sessions: AuthSessions,
    pub views: Views,
    /// Client for the identity-provider token exchange.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn SessionStore>) -> Result<Self, minijinja::Error> {
        let adk = AdkClient::new(config.adk.base_url.clone());
        let auth_sessions = AuthSessions::new(config.server.secret_key.clone());
        Ok(Self {
            config,
            adk,
            store,
            auth_sessions,
            views: Views::new()?,
            http: reqwest::Client::new(),
        })
    }
}
