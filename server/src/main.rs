mod config;
mod db;
mod routes;

use std::{net::SocketAddr, sync::Arc};

use config::Config;
use db::Store;
use routes::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store = match config.database_url.as_deref() {
        Some(url) => match db::connect(url).await {
            Ok(pool) => {
                info!("results_store = postgres");
                Store::Postgres(pool)
            }
            Err(e) => {
                warn!("db_connect_failed = {:?}; keeping results in memory", e);
                Store::memory()
            }
        },
        None => {
            warn!("DATABASE_URL not set; keeping results in memory");
            Store::memory()
        }
    };

    let app = routes::router(Arc::new(AppState { store }), &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
