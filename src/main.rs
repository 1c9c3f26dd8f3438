mod analytics;
mod api;
mod config;
mod data;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use api::entrypoints::{Entrypoints, ResponseCache};
use config::{Config, EnvConfig};
use data::alpha_vantage::AlphaVantageClient;
use data::feed::CommodityFeed;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("📈 Commodity Pulse starting...");

    // Load configuration
    let config = if Path::new(CONFIG_PATH).exists() {
        tracing::info!("Loading configuration from {}", CONFIG_PATH);
        Config::load(CONFIG_PATH)?
    } else {
        tracing::warn!("{} not found, using defaults", CONFIG_PATH);
        Config::default()
    };
    let env_config = EnvConfig::load()?;

    let base_url = env_config
        .alpha_vantage_url
        .clone()
        .unwrap_or_else(|| config.provider.base_url.clone());
    tracing::info!("Provider: {}", base_url);

    let provider = Arc::new(AlphaVantageClient::new(base_url, env_config.alpha_vantage_api_key));
    let feed = Arc::new(CommodityFeed::new(provider));

    // One cache for the whole process, shared by every request
    let cache = Arc::new(match config.cache.max_entries {
        Some(max) => {
            tracing::info!("Cache bounded to {} entries", max);
            ResponseCache::with_max_entries(max)
        }
        None => ResponseCache::new(),
    });
    tracing::info!(
        "Cache TTLs (secs): latest={} all={} history={} index={} analysis={}",
        config.cache.latest_ttl_secs,
        config.cache.all_ttl_secs,
        config.cache.history_ttl_secs,
        config.cache.index_ttl_secs,
        config.cache.analysis_ttl_secs
    );

    let api = Arc::new(Entrypoints::new(feed, cache, config.cache.clone()));
    let app = api::routes::router(api);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("✅ Listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
