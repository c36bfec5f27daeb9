//! HTTP client for the remote ADK agent service.
//!
//! The relay never interprets agent output beyond concatenating the text
//! parts of `/run` response events; everything else is passed through.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

/// Timeout for metadata calls (list-apps, session create/delete).
const META_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for `/run` — agent reasoning can take minutes.
const RUN_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum AdkError {
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for AdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Client for the ADK agent HTTP API.
pub struct AdkClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdkClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session_url(&self, agent: &str, user_id: &str, session_id: &str) -> String {
        format!(
            "{}/apps/{}/users/{}/sessions/{}",
            self.base_url, agent, user_id, session_id
        )
    }

    /// Fetch the list of agent apps registered with the service.
    pub async fn list_apps(&self) -> Result<Vec<String>, AdkError> {
        let url = format!("{}/list-apps", self.base_url);
        debug!(%url, "listing agents");

        let response = self
            .client
            .get(&url)
            .timeout(META_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(AdkError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Register a session with the agent service.
    pub async fn create_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), AdkError> {
        let url = self.session_url(agent, user_id, session_id);
        debug!(%url, "creating upstream session");

        let response = self
            .client
            .post(&url)
            .json(&json!({}))
            .timeout(META_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(AdkError::Api { status, body });
        }
        Ok(())
    }

    /// Remove a session from the agent service.
    pub async fn delete_session(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), AdkError> {
        let url = self.session_url(agent, user_id, session_id);
        debug!(%url, "deleting upstream session");

        let response = self
            .client
            .delete(&url)
            .timeout(META_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(AdkError::Api { status, body });
        }
        Ok(())
    }

    /// Relay one user message through `/run` and return the assistant text.
    ///
    /// The response is either a single event object or a list of events;
    /// all `content.parts[].text` fields are concatenated. A body that is
    /// not valid JSON is returned verbatim as the assistant text.
    pub async fn run(
        &self,
        agent: &str,
        user_id: &str,
        session_id: &str,
        message: &str,
    ) -> Result<String, AdkError> {
        let url = format!("{}/run", self.base_url);
        let payload = json!({
            "appName": agent,
            "userId": user_id,
            "sessionId": session_id,
            "newMessage": {
                "role": "user",
                "parts": [{"text": message}],
            },
        });

        debug!(%url, %agent, %session_id, "relaying message");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(RUN_TIMEOUT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(AdkError::Api { status, body });
        }

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(events) => Ok(collect_text(&events)),
            Err(e) => {
                debug!(error = %e, "run response is not JSON, returning raw body");
                Ok(body)
            }
        }
    }
}

/// Concatenate `content.parts[].text` from one event or a list of events.
fn collect_text(events: &serde_json::Value) -> String {
    let mut text = String::new();
    match events {
        serde_json::Value::Array(list) => {
            for event in list {
                append_event_text(event, &mut text);
            }
        }
        other => append_event_text(other, &mut text),
    }
    text
}

fn append_event_text(event: &serde_json::Value, out: &mut String) {
    let Some(parts) = event
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    else {
        return;
    };
    for part in parts {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            out.push_str(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_text_from_event_list() {
        let events = json!([
            {"content": {"parts": [{"text": "Hello"}, {"text": ", "}]}},
            {"content": {"parts": [{"text": "world"}]}},
        ]);
        assert_eq!(collect_text(&events), "Hello, world");
    }

    #[test]
    fn collect_text_from_single_event() {
        let event = json!({"content": {"parts": [{"text": "just one"}]}});
        assert_eq!(collect_text(&event), "just one");
    }

    #[test]
    fn collect_text_skips_non_text_parts() {
        let events = json!([
            {"content": {"parts": [{"functionCall": {"name": "tool"}}, {"text": "after"}]}},
        ]);
        assert_eq!(collect_text(&events), "after");
    }

    #[test]
    fn collect_text_tolerates_missing_content() {
        let events = json!([{"author": "agent"}, {"content": {}}]);
        assert_eq!(collect_text(&events), "");
    }

    #[test]
    fn session_url_layout() {
        let client = AdkClient::new("http://localhost:8000".to_string());
        assert_eq!(
            client.session_url("reporting", "u_123", "s_1"),
            "http://localhost:8000/apps/reporting/users/u_123/sessions/s_1"
        );
    }
}
