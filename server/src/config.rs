use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::Context;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "web/dist";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; results stay in memory without one.
    pub database_url: Option<String>,
    /// Built front end, served with an `index.html` fallback.
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("BIND_ADDR is not a socket address: {bind}"))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            bind_addr,
            database_url,
            static_dir,
        })
    }
}
