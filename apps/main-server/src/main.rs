//! TaskFlow Server binary.

use std::net::SocketAddr;

use task_store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use taskflow_server::{config::Config, create_app, create_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    match config.database_url.clone() {
        Some(url) => {
            tracing::info!("Using SQLite store");
            let store = SqliteTaskStore::connect(&url).await?;
            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, data will not survive a restart");
            serve(config, MemoryTaskStore::new()).await
        }
    }
}

async fn serve<S: TaskStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!("Starting TaskFlow Server");

    let state = create_state(config, store);
    let app = create_app(state);

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
