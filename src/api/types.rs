//! Wire types for the Alpaca market-data, news, and trading endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bar as the data API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct BarResponse {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

/// Paged bars payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BarsResponse {
    #[serde(default)]
    pub bars: Vec<BarResponse>,
    pub next_page_token: Option<String>,
}

/// Latest trade payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestTradeResponse {
    pub trade: LatestTrade,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestTrade {
    #[serde(rename = "p")]
    pub price: Decimal,
}

/// News feed payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsItem {
    pub headline: String,
}

/// Trading account payload; monetary fields arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub cash: Decimal,
}

/// Bracket order request body.
#[derive(Debug, Clone, Serialize)]
pub struct BracketOrderRequest {
    pub symbol: String,
    pub qty: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
    pub order_class: String,
    pub take_profit: TakeProfitLeg,
    pub stop_loss: StopLossLeg,
    pub client_order_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TakeProfitLeg {
    pub limit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StopLossLeg {
    pub stop_price: Decimal,
}

/// Order acknowledgment payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
}

/// Request body for the sentiment inference endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentRequest {
    pub headlines: Vec<String>,
}

/// Response from the sentiment inference endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentResponse {
    pub probability: f64,
    pub label: String,
}
