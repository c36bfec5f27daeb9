//! HTTP router construction.
//!
//! Assembles routes, the auth gate, CORS, and the OpenAPI docs into a
//! single Axum `Router`.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::state::AppState;
use crate::{api, auth, views};

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(views::index))
        .route("/health", get(api::health))
        .route("/api/list-agents", get(api::list_agents))
        .route("/api/sessions", get(api::sessions_list))
        .route("/api/create-session", post(api::sessions_create))
        .route("/api/delete-session", delete(api::sessions_delete))
        .route("/api/send-message", post(api::send_message))
        .route("/login", get(auth::login_page).post(auth::login_post))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/store-tokens", post(auth::store_tokens))
        .route("/auth/manual-token", post(auth::manual_token))
        .route("/logout", get(auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use relay_core::config::{AdkConfig, AuthConfig, ServerConfig, StoreBackend, StoreConfig};
    use relay_core::Config;
    use relay_store::MemoryStore;

    fn test_config(auth_enabled: bool) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                secret_key: "test-secret".to_string(),
            },
            adk: AdkConfig {
                // Unroutable: relay endpoints that hit upstream are not
                // exercised in these tests.
                base_url: "http://127.0.0.1:1".to_string(),
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                db_path: "unused.db".into(),
            },
            auth: AuthConfig {
                enabled: auth_enabled,
                tenant_id: "tenant".to_string(),
                client_id: "client".to_string(),
                client_secret: None,
                scopes: "openid".to_string(),
                redirect_uri: "http://localhost:5000/auth/callback".to_string(),
            },
        }
    }

    fn test_app(auth_enabled: bool) -> Router {
        let state = Arc::new(
            AppState::new(test_config(auth_enabled), Arc::new(MemoryStore::new()))
                .expect("templates parse"),
        );
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_api_request_redirects_to_login() {
        let app = test_app(true);
        let response = app
            .oneshot(
                Request::get("/api/sessions?agent=a&user=u")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[tokio::test]
    async fn index_redirects_when_unauthenticated() {
        let app = test_app(true);
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app(true);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["authenticated"], false);
    }

    #[tokio::test]
    async fn login_page_is_public() {
        let app = test_app(true);
        let response = app
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mock_login_grants_access_to_gated_routes() {
        let app = test_app(true);

        let response = app
            .clone()
            .oneshot(Request::post("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/");

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .oneshot(
                Request::get("/api/sessions?agent=a&user=u")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn tampered_cookie_is_redirected() {
        let app = test_app(true);
        let response = app
            .oneshot(
                Request::get("/api/sessions?agent=a&user=u")
                    .header(COOKIE, "relay_session=forged.aaaaaaaa")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[tokio::test]
    async fn disabled_auth_gate_passes_everything() {
        let app = test_app(false);
        let response = app
            .oneshot(
                Request::get("/api/sessions?agent=a&user=u")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_tokens_requires_access_token() {
        let app = test_app(true);
        let response = app
            .oneshot(
                Request::post("/auth/store-tokens")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Access token is required");
    }

    #[tokio::test]
    async fn store_tokens_establishes_a_session() {
        let app = test_app(true);
        let response = app
            .clone()
            .oneshot(
                Request::post("/auth/store-tokens")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"access_token": "tok-123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let body = body_json(response).await;
        assert_eq!(body["success"], true);

        let response = app
            .oneshot(
                Request::get("/health")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
    }

    #[tokio::test]
    async fn manual_token_rejects_non_jwt_shapes() {
        let app = test_app(true);
        let response = app
            .oneshot(
                Request::post("/auth/manual-token")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token": "no-dots-here"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid token format. Must be a valid JWT.");
    }

    #[tokio::test]
    async fn manual_token_accepts_three_part_strings() {
        let app = test_app(true);
        let response = app
            .oneshot(
                Request::post("/auth/manual-token")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token": "aaa.bbb.ccc"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let app = test_app(true);

        let response = app
            .clone()
            .oneshot(Request::post("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get("/logout")
                    .header(COOKIE, cookie.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[LOCATION], "/login");

        // The old cookie no longer resolves to a session.
        let response = app
            .oneshot(
                Request::get("/api/sessions?agent=a&user=u")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_redirection());
    }
}
