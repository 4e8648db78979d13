#![allow(dead_code)]

use std::sync::Arc;

use auth::Authenticator;
use sso_service::domain::auth::models::App;
use sso_service::domain::auth::models::AppId;
use sso_service::domain::auth::models::AppLookupPolicy;
use sso_service::domain::auth::models::AppSecret;
use sso_service::domain::auth::ports::AuthServicePort;
use sso_service::domain::auth::service::AuthService;
use sso_service::inbound::grpc::AuthGrpcService;
use sso_service::inbound::http::router::create_router;
use sso_service::outbound::repositories::SqliteCredentialStore;
use sso_service::proto::auth_client::AuthClient;
use sso_service::proto::auth_server::AuthServer;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Channel;
use tonic::transport::Server;

pub const TOKEN_TTL_SECS: i64 = 3_600;

pub const APP_ID: i32 = 1;
pub const APP_SECRET: &str = "test-secret";

pub const OTHER_APP_ID: i32 = 2;
pub const OTHER_APP_SECRET: &str = "other-secret";

/// Test application that spawns real HTTP and gRPC servers over an in-memory database
pub struct TestApp {
    pub address: String,
    pub grpc_address: String,
    pub store: Arc<SqliteCredentialStore>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in background tasks and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(AppLookupPolicy::Conceal).await
    }

    pub async fn spawn_with_policy(policy: AppLookupPolicy) -> Self {
        let store = SqliteCredentialStore::in_memory()
            .await
            .expect("Failed to open in-memory database");
        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");

        for (id, name, secret) in [
            (APP_ID, "test", APP_SECRET),
            (OTHER_APP_ID, "other", OTHER_APP_SECRET),
        ] {
            store
                .upsert_app(&App {
                    id: AppId(id),
                    name: name.to_string(),
                    secret: AppSecret::new(secret),
                })
                .await
                .expect("Failed to provision app");
        }

        let store = Arc::new(store);
        let authenticator = Arc::new(
            Authenticator::new(chrono::Duration::seconds(TOKEN_TTL_SECS))
                .expect("Failed to create authenticator"),
        );
        let auth_service: Arc<dyn AuthServicePort> = Arc::new(
            AuthService::new(Arc::clone(&store), authenticator).with_app_lookup_policy(policy),
        );

        // Use random ports (0 = OS assigns)
        let http_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://{}", http_listener.local_addr().unwrap());

        let router = create_router(Arc::clone(&auth_service));
        tokio::spawn(async move {
            axum::serve(http_listener, router).await.expect("Server error");
        });

        let grpc_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let grpc_address = format!("http://{}", grpc_listener.local_addr().unwrap());

        let grpc_service = AuthGrpcService::new(auth_service);
        tokio::spawn(async move {
            Server::builder()
                .add_service(AuthServer::new(grpc_service))
                .serve_with_incoming(TcpListenerStream::new(grpc_listener))
                .await
                .expect("gRPC server error");
        });

        Self {
            address,
            grpc_address,
            store,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub async fn grpc_client(&self) -> AuthClient<Channel> {
        AuthClient::connect(self.grpc_address.clone())
            .await
            .expect("Failed to connect gRPC client")
    }

    pub async fn user_count(&self) -> i64 {
        self.store.user_count().await.expect("Failed to count users")
    }
}
