mod api;
mod config;
mod data;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use config::Config;
use data::DatasetCache;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` first so it can carry RUST_LOG / LOG_LEVEL too.
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("reading configuration")?;
    info!("starting with {config:?}");

    // Handlers only ever see the loaded dataset, never the cache.
    let cache = Arc::new(DatasetCache::new());
    let dataset = {
        let cache = Arc::clone(&cache);
        let path = config.data_file.clone();
        tokio::task::spawn_blocking(move || cache.get_or_load(&path))
            .await
            .context("dataset loader task failed")?
            .with_context(|| format!("loading dataset from {}", config.data_file.display()))?
    };

    info!("{} dataset(s) cached", cache.len());

    let app = api::router(AppState::new(dataset, config.data_file.clone()), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!("listening on http://{}", listener.local_addr()?);
    info!("API under http://{}{}", listener.local_addr()?, api::API_V1_PREFIX);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

fn init_logging() {
    let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
