//! Order intent model: the sole output artifact of a decision cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an entry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// A bracketed entry order: market entry paired with a take-profit and
/// a protective stop.
///
/// For buys `stop_loss < last_price < take_profit`; for sells the
/// inequality is mirrored. Quantity is always a whole, non-negative
/// number of shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,

    /// Whole shares, rounded half-away-from-zero, never negative
    pub quantity: u64,

    pub take_profit: Decimal,
    pub stop_loss: Decimal,
}

/// Broker acknowledgment for a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub status: String,
}
