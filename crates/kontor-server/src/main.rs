//! KONTOR Server — Application entry point.

use kontor_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kontor=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting KONTOR server...");

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    kontor_db::run_migrations(manager.client()).await?;

    // TODO: Start REST API server

    tracing::info!("KONTOR server stopped.");

    Ok(())
}
