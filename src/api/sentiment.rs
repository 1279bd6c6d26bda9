//! News-sentiment provider backed by a FinBERT-style inference service.
//!
//! Headlines come from the Alpaca news feed; classification happens in
//! an external model server that returns a (probability, label) pair
//! for the batch.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{SentimentLabel, Signal};

use super::alpaca_data::AlpacaDataClient;
use super::types::{SentimentRequest, SentimentResponse};
use super::NewsSentiment;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sentiment client: news fetch plus remote classification.
pub struct SentimentClient {
    client: Client,
    inference_url: String,
    data: AlpacaDataClient,
}

impl SentimentClient {
    /// `inference_url` is the POST endpoint of the classifier service
    /// (`SENTIMENT_URL` in the environment for the CLI).
    pub fn new(data: AlpacaDataClient, inference_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            inference_url,
            data,
        })
    }

    async fn classify(&self, headlines: Vec<String>) -> Result<Signal> {
        let response = self
            .client
            .post(&self.inference_url)
            .json(&SentimentRequest { headlines })
            .send()
            .await
            .context("Failed to reach sentiment service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sentiment request failed: {} - {}", status, body);
        }

        let result: SentimentResponse = response
            .json()
            .await
            .context("Failed to parse sentiment response")?;

        let label = match result.label.to_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            "neutral" => SentimentLabel::Neutral,
            other => {
                warn!(label = %other, "Unknown sentiment label, treating as neutral");
                SentimentLabel::Neutral
            }
        };

        if !(0.0..=1.0).contains(&result.probability) {
            anyhow::bail!(
                "Sentiment probability {} outside [0, 1]",
                result.probability
            );
        }

        Ok(Signal {
            probability: result.probability,
            label,
        })
    }
}

impl NewsSentiment for SentimentClient {
    async fn get_sentiment(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Signal> {
        let headlines = self.data.get_news(symbol, start, end).await?;

        if headlines.is_empty() {
            debug!(symbol = %symbol, "No news in window, neutral signal");
            return Ok(Signal::neutral());
        }

        debug!(symbol = %symbol, count = headlines.len(), "Classifying headlines");
        self.classify(headlines).await
    }
}
