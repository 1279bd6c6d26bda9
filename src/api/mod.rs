//! External collaborators: market data, news sentiment, and the broker.
//!
//! The decision core never talks to these directly; the driver fetches
//! through the capability traits below and hands plain values to the
//! engine, so tests substitute fakes with no HTTP involved.

mod alpaca_broker;
mod alpaca_data;
mod sentiment;
mod types;

pub use alpaca_broker::AlpacaBrokerClient;
pub use alpaca_data::AlpacaDataClient;
pub use sentiment::SentimentClient;
pub use types::*;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{Bar, OrderAck, OrderIntent, Signal};

/// Read-only market data access.
#[allow(async_fn_in_trait)]
pub trait MarketData {
    /// Bars in ascending time order for the window.
    async fn get_bars(
        &self,
        symbol: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>>;

    /// Latest traded price for the symbol.
    async fn get_last_price(&self, symbol: &str) -> Result<Decimal>;
}

/// News sentiment classification for a symbol over a date window.
#[allow(async_fn_in_trait)]
pub trait NewsSentiment {
    async fn get_sentiment(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Signal>;
}

/// Order submission and account state.
#[allow(async_fn_in_trait)]
pub trait Broker {
    async fn get_cash(&self) -> Result<Decimal>;

    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderAck>;

    /// Close every open position in the symbol.
    async fn liquidate_all(&self, symbol: &str) -> Result<()>;
}

/// Alpaca API credentials, loaded once at startup and passed into the
/// clients explicitly.
#[derive(Debug, Clone)]
pub struct AlpacaCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl AlpacaCredentials {
    /// Read `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY` from the
    /// environment (a `.env` file is honored via dotenvy in main).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: std::env::var("APCA_API_KEY_ID")
                .context("APCA_API_KEY_ID not set")?,
            api_secret: std::env::var("APCA_API_SECRET_KEY")
                .context("APCA_API_SECRET_KEY not set")?,
        })
    }
}
