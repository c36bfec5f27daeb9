//! Azure AD token exchange and best-effort id-token decoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, info, warn};

use relay_core::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token exchange failed: {0}")]
    Exchange(String),
}

/// Tokens returned by the identity provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSet {
    #[serde(default)]
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
}

/// User profile pulled from an id token (or the fallback placeholder).
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub display_name: String,
    pub name: String,
    pub email: Option<String>,
    pub oid: Option<String>,
}

impl UserProfile {
    fn fallback() -> Self {
        Self {
            display_name: "Authenticated User".to_string(),
            name: "Authenticated User".to_string(),
            email: None,
            oid: None,
        }
    }
}

/// Exchange an authorization code for tokens at the fixed tenant endpoint.
///
/// The client secret is only included for confidential clients; public
/// clients complete the exchange without one.
pub async fn exchange_code_for_tokens(
    http: &reqwest::Client,
    auth: &AuthConfig,
    code: &str,
) -> Result<TokenSet, TokenError> {
    let token_url = auth.token_url();
    let mut form = vec![
        ("client_id", auth.client_id.as_str()),
        ("scope", auth.scopes.as_str()),
        ("code", code),
        ("redirect_uri", auth.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];
    if let Some(secret) = auth.client_secret.as_deref() {
        form.push(("client_secret", secret));
        info!("token exchange using client secret");
    } else {
        info!("token exchange without client secret (public client)");
    }

    debug!(%token_url, scope = %auth.scopes, "exchanging authorization code");

    let response = http.post(&token_url).form(&form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "token exchange rejected");
        return Err(TokenError::Exchange(body));
    }

    let tokens: TokenSet =
        serde_json::from_str(&body).map_err(|e| TokenError::Exchange(e.to_string()))?;
    info!("token exchange successful");
    Ok(tokens)
}

/// Decode an id token's payload without signature verification.
///
/// The relay only uses the claims for display; the token is otherwise
/// passed through untouched. Anything undecodable yields the fallback
/// profile rather than an error.
pub fn decode_id_token(id_token: Option<&str>) -> UserProfile {
    let Some(token) = id_token.filter(|t| !t.is_empty()) else {
        return UserProfile::fallback();
    };

    let Some(payload) = token.split('.').nth(1) else {
        return UserProfile::fallback();
    };

    let decoded = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "could not base64-decode id token payload");
            return UserProfile::fallback();
        }
    };

    let claims: serde_json::Value = match serde_json::from_slice(&decoded) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "could not parse id token payload");
            return UserProfile::fallback();
        }
    };

    let name = claims
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("Authenticated User")
        .to_string();
    let email = claims
        .get("email")
        .or_else(|| claims.get("preferred_username"))
        .and_then(|v| v.as_str())
        .map(String::from);
    let oid = claims
        .get("oid")
        .and_then(|v| v.as_str())
        .map(String::from);

    UserProfile {
        display_name: name.clone(),
        name,
        email,
        oid,
    }
}
