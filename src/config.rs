use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Server settings, read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string. Without one, books live in memory.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind_addr}"))?;

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(size) => size
                .parse()
                .with_context(|| format!("DB_POOL_SIZE is not a positive integer: {size}"))?,
            None => DEFAULT_POOL_SIZE,
        };
        anyhow::ensure!(pool_size > 0, "DB_POOL_SIZE must be at least 1");

        Ok(Config {
            database_url,
            bind_addr,
            pool_size,
        })
    }
}
