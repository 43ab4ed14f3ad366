use std::sync::Arc;

use anyhow::Context;
use edunow_progress::{
    config::{Config, StorageBackend},
    create_router,
    services::AppState,
    storage::{LearningStore, MemoryStore, MongoStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting EduNow progress service");

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded for environment: {:?}, storage backend: {}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string()),
        config.storage_backend
    );

    let store: Arc<dyn LearningStore> = match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, progress is lost on restart");
            match &config.seed_path {
                Some(path) => Arc::new(MemoryStore::from_seed_file(path).await?),
                None => {
                    tracing::warn!(
                        "No storage.seed_path configured, the memory store starts empty and every lookup returns 404"
                    );
                    Arc::new(MemoryStore::new())
                }
            }
        }
        StorageBackend::Mongo => Arc::new(
            MongoStore::connect(&config.mongo_uri, &config.mongo_database).await?,
        ),
    };

    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config, store));
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "edunow_progress=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
