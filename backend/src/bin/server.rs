//! Shift planner HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # In-memory repository (default)
//! cargo run --bin shift-planner-server
//!
//! # PostgreSQL repository
//! DATABASE_URL=postgres://planner@localhost/shifts \
//!   cargo run --bin shift-planner-server --features postgres-repo
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log level (default: info)
//! - `REPOSITORY_TYPE`: `local` or `postgres`; takes precedence over `repository.toml`
//! - `DATABASE_URL`: PostgreSQL connection string

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use shift_planner::db::{FullRepository, RepositoryConfig, RepositoryFactory};
use shift_planner::http::{create_router, AppState};
use shift_planner::models::DisplayFormat;

/// Pick the repository and display formats: `REPOSITORY_TYPE` wins, then
/// `repository.toml`, then the environment defaults.
async fn load_repository() -> anyhow::Result<(Arc<dyn FullRepository>, DisplayFormat)> {
    let config = match RepositoryConfig::from_default_location() {
        Ok(config) => Some(config),
        Err(e) => {
            info!("{}; using environment configuration", e);
            None
        }
    };

    let repository = match &config {
        Some(config) if env::var("REPOSITORY_TYPE").is_err() => {
            RepositoryFactory::from_repository_config(config).await?
        }
        _ => RepositoryFactory::from_env().await?,
    };
    let display = config.map(|c| c.display).unwrap_or_default();

    Ok((repository, display))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting shift planner server");

    let (repository, display) = load_repository().await?;
    match repository.health_check().await {
        Ok(true) => info!("Repository initialized successfully"),
        Ok(false) => warn!("Repository reports unhealthy at startup"),
        Err(e) => warn!("Repository health check failed: {}", e),
    }

    let state = AppState::new(repository).with_display(display);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
