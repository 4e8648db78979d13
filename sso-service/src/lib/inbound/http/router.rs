use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::is_admin::is_admin;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::validate::validate;
use crate::domain::auth::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>) -> Router {
    let state = AppState { auth_service };

    let auth_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/validate", post(validate));

    let user_routes = Router::new().route("/api/users/:user_id/admin", get(is_admin));

    // Headers are left out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use auth::Authenticator;
    use axum::http::header::AUTHORIZATION;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::auth::models::App;
    use crate::domain::auth::models::AppId;
    use crate::domain::auth::models::AppSecret;
    use crate::domain::auth::models::UserId;
    use crate::domain::auth::service::AuthService;
    use crate::outbound::repositories::InMemoryCredentialStore;

    fn app(id: i32, secret: &str) -> App {
        App {
            id: AppId(id),
            name: format!("app-{id}"),
            secret: AppSecret::new(secret),
        }
    }

    fn router_with_store() -> (Router, Arc<InMemoryCredentialStore>) {
        let store = Arc::new(InMemoryCredentialStore::with_apps([app(1, "test-secret")]));
        let authenticator = Arc::new(Authenticator::new(chrono::Duration::hours(1)).unwrap());
        let router = create_router(Arc::new(AuthService::new(store.clone(), authenticator)));
        (router, store)
    }

    fn router() -> Router {
        router_with_store().0
    }

    fn register_request(email: &str) -> Request<Body> {
        post_json(
            "/api/auth/register",
            json!({ "email": email, "password": "Str0ngP@ss" }),
        )
    }

    fn validate_request(token: &str, app_id: i32) -> Request<Body> {
        let mut request = post_json("/api/auth/validate", json!({ "app_id": app_id }));
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        request
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_register_login_validate() {
        let router = router();

        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/register",
                json!({ "email": "alice@example.com", "password": "Str0ngP@ss" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["user_id"], 1);

        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/login",
                json!({ "email": "alice@example.com", "password": "Str0ngP@ss", "app_id": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(&router, validate_request(&token, 1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["uid"], 1);
        assert_eq!(body["data"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_validate_without_bearer_header() {
        let (status, body) = send(
            &router(),
            post_json("/api/auth/validate", json!({ "app_id": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status_code"], 401);
        assert_eq!(body["data"]["message"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn test_is_admin_unknown_user() {
        let request = Request::builder()
            .uri("/api/users/5/admin")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&router(), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["data"]["message"], "User not found: 5");
    }

    #[tokio::test]
    async fn test_register_duplicate_keeps_one_user() {
        let (router, store) = router_with_store();

        let (status, _) = send(&router, register_request("alice@example.com")).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&router, register_request("ALICE@example.com")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status_code"], 409);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_validate_rejects_token_for_newly_provisioned_app() {
        let (router, store) = router_with_store();
        store.upsert_app(app(2, "other-secret")).await;

        send(&router, register_request("alice@example.com")).await;
        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/login",
                json!({ "email": "alice@example.com", "password": "Str0ngP@ss", "app_id": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, _) = send(&router, validate_request(&token, 2)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/login",
                json!({ "email": "alice@example.com", "password": "Str0ngP@ss", "app_id": 2 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(&router, validate_request(&token, 2)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["app_id"], 2);
    }

    #[tokio::test]
    async fn test_is_admin_reflects_granted_flag() {
        let (router, store) = router_with_store();
        send(&router, register_request("root@example.com")).await;

        let is_admin = || {
            Request::builder()
                .uri("/api/users/1/admin")
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(&router, is_admin()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_admin"], false);

        store.set_admin(UserId(1), true).await.unwrap();

        let (_, body) = send(&router, is_admin()).await;
        assert_eq!(body["data"]["is_admin"], true);
    }
}
