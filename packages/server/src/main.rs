use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::FilesystemObjectStore;
use server::config::AppConfig;
use server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    server::seed::ensure_indexes(&db).await?;

    let objects = FilesystemObjectStore::new(
        PathBuf::from(&config.storage.root),
        config.storage.max_object_size,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        objects: Arc::new(objects),
        config: Arc::new(config),
    };

    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
