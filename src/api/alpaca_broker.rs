//! Alpaca trading client: account cash, bracket orders, liquidation.

use anyhow::{Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{OrderAck, OrderIntent};

use super::types::*;
use super::{AlpacaCredentials, Broker};

const PAPER_API_BASE: &str = "https://paper-api.alpaca.markets";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Alpaca trading API.
///
/// Points at the paper endpoint by default; pass the live base URL
/// explicitly to trade real money.
pub struct AlpacaBrokerClient {
    client: Client,
    base_url: String,
    credentials: AlpacaCredentials,
}

impl AlpacaBrokerClient {
    pub fn new(credentials: AlpacaCredentials) -> Result<Self> {
        Self::with_base_url(credentials, PAPER_API_BASE.to_string())
    }

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

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("APCA-API-KEY-ID", &self.credentials.api_key)
            .header("APCA-API-SECRET-KEY", &self.credentials.api_secret)
    }
}

impl Broker for AlpacaBrokerClient {
    async fn get_cash(&self) -> Result<Decimal> {
        let url = format!("{}/v2/account", self.base_url);
        debug!(url = %url, "Fetching account");

        let response = self
            .auth(self.client.get(&url))
            .send()
            .await
            .context("Failed to fetch account")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Account request failed: {} - {}", status, body);
        }

        let account: AccountResponse = response
            .json()
            .await
            .context("Failed to parse account response")?;

        Ok(account.cash)
    }

    async fn submit_order(&self, intent: &OrderIntent) -> Result<OrderAck> {
        let url = format!("{}/v2/orders", self.base_url);

        let request = BracketOrderRequest {
            symbol: intent.symbol.clone(),
            qty: intent.quantity.to_string(),
            side: intent.side.as_str().to_string(),
            order_type: "market".to_string(),
            time_in_force: "gtc".to_string(),
            order_class: "bracket".to_string(),
            take_profit: TakeProfitLeg {
                limit_price: intent.take_profit,
            },
            stop_loss: StopLossLeg {
                stop_price: intent.stop_loss,
            },
            client_order_id: Uuid::new_v4().to_string(),
        };

        debug!(url = %url, symbol = %intent.symbol, "Submitting bracket order");

        let response = self
            .auth(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .context("Failed to submit order")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Order submission failed: {} - {}", status, body);
        }

        let order: OrderResponse = response
            .json()
            .await
            .context("Failed to parse order response")?;

        info!(
            order_id = %order.id,
            status = %order.status,
            symbol = %intent.symbol,
            "Order accepted"
        );

        Ok(OrderAck {
            order_id: order.id,
            status: order.status,
        })
    }

    async fn liquidate_all(&self, symbol: &str) -> Result<()> {
        let url = format!("{}/v2/positions/{}", self.base_url, symbol);
        debug!(url = %url, "Liquidating position");

        let response = self
            .auth(self.client.delete(&url))
            .send()
            .await
            .context("Failed to liquidate position")?;

        // 404 means no open position; nothing to close.
        if response.status().as_u16() == 404 {
            debug!(symbol = %symbol, "No open position to liquidate");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Liquidation failed: {} - {}", status, body);
        }

        info!(symbol = %symbol, "Position liquidated");
        Ok(())
    }
}
