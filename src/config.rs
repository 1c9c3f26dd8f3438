use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Per-operation cache lifetimes
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_latest_ttl")]
    pub latest_ttl_secs: u64,
    #[serde(default = "default_all_ttl")]
    pub all_ttl_secs: u64,
    #[serde(default = "default_history_ttl")]
    pub history_ttl_secs: u64,
    #[serde(default = "default_index_ttl")]
    pub index_ttl_secs: u64,
    #[serde(default = "default_analysis_ttl")]
    pub analysis_ttl_secs: u64,
    #[serde(default)]
    pub max_entries: Option<usize>,
}

fn default_bind_addr() -> String { "0.0.0.0:3000".to_string() }
fn default_base_url() -> String { "https://www.alphavantage.co".to_string() }
fn default_latest_ttl() -> u64 { 300 }
fn default_all_ttl() -> u64 { 600 }
fn default_history_ttl() -> u64 { 3600 }
fn default_index_ttl() -> u64 { 3600 }
fn default_analysis_ttl() -> u64 { 900 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            latest_ttl_secs: default_latest_ttl(),
            all_ttl_secs: default_all_ttl(),
            history_ttl_secs: default_history_ttl(),
            index_ttl_secs: default_index_ttl(),
            analysis_ttl_secs: default_analysis_ttl(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn latest_ttl(&self) -> Duration { Duration::from_secs(self.latest_ttl_secs) }
    pub fn all_ttl(&self) -> Duration { Duration::from_secs(self.all_ttl_secs) }
    pub fn history_ttl(&self) -> Duration { Duration::from_secs(self.history_ttl_secs) }
    pub fn index_ttl(&self) -> Duration { Duration::from_secs(self.index_ttl_secs) }
    pub fn analysis_ttl(&self) -> Duration { Duration::from_secs(self.analysis_ttl_secs) }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub alpha_vantage_api_key: String,
    pub alpha_vantage_url: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY")
                .context("ALPHA_VANTAGE_API_KEY not set")?,
            alpha_vantage_url: std::env::var("ALPHA_VANTAGE_URL").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [provider]
            base_url = "http://localhost:9000"

            [cache]
            latest_ttl_secs = 60
            all_ttl_secs = 120
            history_ttl_secs = 1800
            index_ttl_secs = 7200
            analysis_ttl_secs = 300
            max_entries = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.provider.base_url, "http://localhost:9000");
        assert_eq!(config.cache.latest_ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.max_entries, Some(500));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.provider.base_url, "https://www.alphavantage.co");
        assert_eq!(config.cache.analysis_ttl(), Duration::from_secs(900));
        assert_eq!(config.cache.max_entries, None);
    }

    #[test]
    fn test_partial_cache_section() {
        let config = Config::parse("[cache]\nlatest_ttl_secs = 10\n").unwrap();
        assert_eq!(config.cache.latest_ttl_secs, 10);
        assert_eq!(config.cache.all_ttl_secs, 600);
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(Config::parse("[cache\nlatest_ttl_secs = ").is_err());
    }
}
