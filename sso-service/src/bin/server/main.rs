use std::str::FromStr;
use std::sync::Arc;

use auth::Authenticator;
use sqlx::sqlite::SqliteConnectOptions;
use sso_service::config::Config;
use sso_service::domain::auth::ports::AuthServicePort;
use sso_service::domain::auth::service::AuthService;
use sso_service::inbound::grpc::AuthGrpcService;
use sso_service::inbound::http::router::create_router;
use sso_service::outbound::repositories::SqliteCredentialStore;
use sso_service::proto::auth_server::AuthServer;
use tokio::sync::watch;
use tonic::transport::Server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "sso-service",
        version = env!("CARGO_PKG_VERSION"),
        env = %config.env,
        "Service starting"
    );

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        grpc_port = config.server.grpc_port,
        token_ttl_secs = config.token.ttl_secs,
        app_lookup_policy = ?config.login.app_lookup_policy,
        apps = config.apps.len(),
        "Configuration loaded"
    );

    if let Some(dir) = config.database.storage_dir() {
        tokio::fs::create_dir_all(&dir).await?;
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database.url)?;
    let store = Arc::new(
        SqliteCredentialStore::connect(connect_options, config.database.max_connections).await?,
    );
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "sqlite",
        "Database connection pool created"
    );

    store.run_migrations().await?;
    tracing::info!(database = "sqlite", "Database migrations completed");

    for app_config in &config.apps {
        store.upsert_app(&app_config.to_app()?).await?;
        tracing::info!(app_id = app_config.id, app_name = %app_config.name, "App provisioned");
    }

    let authenticator = Arc::new(Authenticator::new(chrono::Duration::seconds(
        config.token.ttl_secs,
    ))?);

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(
        AuthService::new(store, authenticator)
            .with_app_lookup_policy(config.login.app_lookup_policy)
            .with_store_timeout(config.store.timeout()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(Arc::clone(&auth_service));
    let http_shutdown = shutdown_rx.clone();
    let http_server = tokio::spawn(async move {
        axum::serve(http_listener, http_application)
            .with_graceful_shutdown(shutdown_requested(http_shutdown))
            .await
    });

    let grpc_address = format!("0.0.0.0:{}", config.server.grpc_port).parse()?;
    let grpc_service = AuthGrpcService::new(Arc::clone(&auth_service));
    let grpc_timeout = config.server.grpc_timeout();
    tracing::info!(
        address = %grpc_address,
        port = config.server.grpc_port,
        protocol = "grpc",
        "gRpc server listening"
    );

    let grpc_server = tokio::spawn(async move {
        Server::builder()
            .timeout(grpc_timeout)
            .add_service(AuthServer::new(grpc_service))
            .serve_with_shutdown(grpc_address, shutdown_requested(shutdown_rx))
            .await
    });

    let (http_result, grpc_result) = tokio::try_join!(http_server, grpc_server)?;
    http_result?;
    grpc_result?;

    tracing::info!("Servers exited successfully");
    Ok(())
}

async fn shutdown_requested(mut shutdown: watch::Receiver<()>) {
    // Either a send or a dropped sender means stop.
    let _ = shutdown.changed().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
