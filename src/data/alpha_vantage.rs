use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use crate::data::error::FeedError;
use crate::data::types::{Interval, RawSeries};

/// Source of raw commodity series
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetch the newest-first series for a provider function identifier
    async fn fetch_series(&self, function: &str, interval: Interval) -> Result<RawSeries, FeedError>;
}

pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }
}

#[async_trait]
impl SeriesProvider for AlphaVantageClient {
    async fn fetch_series(&self, function: &str, interval: Interval) -> Result<RawSeries, FeedError> {
        debug!("Fetching {} ({})", function, interval);

        let response = self.client
            .get(self.query_url())
            .query(&[
                ("function", function),
                ("interval", interval.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Provider returned {} for {}", status, function);
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let series: RawSeries = serde_json::from_str(&body)
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        if series.data.is_empty() {
            warn!("Provider returned no data points for {}", function);
        }

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_strips_trailing_slash() {
        let client = AlphaVantageClient::new(
            "https://www.alphavantage.co/".to_string(),
            "demo".to_string(),
        );
        assert_eq!(client.query_url(), "https://www.alphavantage.co/query");
    }
}
