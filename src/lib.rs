mod api;
pub mod config;
pub mod console;
mod database;
mod error;
mod memory;
pub mod models;
mod repo;
mod schema;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{serve::Serve, Router};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use api::{build_api, BOOKS_PATH};
pub use config::Config;
pub use database::{create_db_pool, DatabaseBookRepo, DatabaseError};
pub use error::ApiError;
pub use memory::{InMemoryBookRepo, MemoryStoreError};
pub use repo::{BookRepo, StoreError};

/// Binds the listener and returns its address along with the server future.
pub async fn start_server(
    config: Config,
) -> anyhow::Result<(SocketAddr, Serve<TcpListener, Router, Router>)> {
    let router = match &config.database_url {
        Some(db_url) => {
            let pool = create_db_pool(db_url, config.pool_size)
                .await
                .context("failed to create DB connection pool")?;
            build_api(DatabaseBookRepo::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set, books will only be kept in memory");
            build_api(InMemoryBookRepo::new())
        }
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;
    info!("Listening on {}", local_addr);

    Ok((local_addr, axum::serve(listener, router)))
}
