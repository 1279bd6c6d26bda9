//! Alpaca market-data client: historical bars, latest price, news.

use anyhow::{Context, Result};
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

use crate::models::Bar;

use super::types::*;
use super::{AlpacaCredentials, MarketData};

const DATA_API_BASE: &str = "https://data.alpaca.markets";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(60);

/// Client for the Alpaca data API (read-only operations).
pub struct AlpacaDataClient {
    client: Client,
    base_url: String,
    credentials: AlpacaCredentials,
}

impl AlpacaDataClient {
    /// Create a new data client with default settings.
    pub fn new(credentials: AlpacaCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: DATA_API_BASE.to_string(),
            credentials,
        })
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(credentials: AlpacaCredentials, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// GET with auth headers, retrying transient failures with
    /// exponential backoff. Non-success statuses are permanent.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_ELAPSED),
            ..ExponentialBackoff::default()
        };

        let body = backoff::future::retry(policy, || async {
            debug!(url = %url, "GET");

            let response = self
                .client
                .get(url)
                .header("APCA-API-KEY-ID", &self.credentials.api_key)
                .header("APCA-API-SECRET-KEY", &self.credentials.api_secret)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(anyhow::Error::from(e)))?;

            let status = response.status();
            if status.is_server_error() || status.as_u16() == 429 {
                return Err(backoff::Error::transient(anyhow::anyhow!(
                    "retryable status {status} from {url}"
                )));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(backoff::Error::permanent(anyhow::anyhow!(
                    "request failed: {status} - {body}"
                )));
            }

            response
                .text()
                .await
                .map_err(|e| backoff::Error::transient(anyhow::Error::from(e)))
        })
        .await?;

        serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {url}"))
    }

    /// Fetch news headlines for a symbol over a date window, most
    /// recent first as the API returns them.
    pub async fn get_news(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/v1beta1/news?symbols={}&start={}&end={}&limit=50",
            self.base_url,
            symbol,
            start.to_rfc3339(),
            end.to_rfc3339()
        );

        let response: NewsResponse = self.get_json(&url).await.context("Failed to fetch news")?;

        Ok(response.news.into_iter().map(|n| n.headline).collect())
    }
}

impl MarketData for AlpacaDataClient {
    async fn get_bars(
        &self,
        symbol: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/v2/stocks/{}/bars?timeframe={}&start={}&end={}&feed=iex&limit=1000",
                self.base_url,
                symbol,
                interval,
                start.to_rfc3339(),
                end.to_rfc3339()
            );
            if let Some(token) = &page_token {
                url = format!("{url}&page_token={token}");
            }

            let page: BarsResponse = self.get_json(&url).await.context("Failed to fetch bars")?;

            bars.extend(page.bars.into_iter().map(|b| Bar {
                timestamp: b.timestamp,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(symbol = %symbol, count = bars.len(), "Fetched bars");
        Ok(bars)
    }

    async fn get_last_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/v2/stocks/{}/trades/latest?feed=iex", self.base_url, symbol);

        let response: LatestTradeResponse = self
            .get_json(&url)
            .await
            .context("Failed to fetch latest trade")?;

        Ok(response.trade.price)
    }
}
