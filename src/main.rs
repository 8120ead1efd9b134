use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vehicle_feedback::auth::service::AuthService;
use vehicle_feedback::auth::store::connect_user_store;
use vehicle_feedback::config::Config;
use vehicle_feedback::feedback::loader::load_dataset_async;
use vehicle_feedback::server::{build_router, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    // 1. Dataset (must be complete before anything is served):
    tracing::info!("Loading data from {}", config.dataset_path.display());
    let dataset = match load_dataset_async(config.dataset_path.clone(), config.dataset_delimiter)
        .await
    {
        Ok(dataset) => Arc::new(dataset),
        Err(e) => {
            tracing::error!("Failed to load initial data: {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Data loaded successfully: {} records", dataset.len());

    // 2. Credential store:
    let store = connect_user_store(&config.user_store)?;
    let auth = Arc::new(AuthService::new(
        store,
        config.password_hash_cost,
        config.redact_password_hash,
    ));

    // 3. HTTP Router:
    let app = build_router(dataset, auth, &config.cors_allowed_origins)?;

    // 4. Start HTTP server:
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
