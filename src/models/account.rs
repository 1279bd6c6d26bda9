//! Account state snapshot for one decision cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-cycle view of the account and the traded symbol's price.
///
/// Cash is updated only between cycles by the broker; the core treats
/// the snapshot as read-only. `initial_cash` lives in the engine, fixed
/// at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Available cash, non-negative
    pub cash: Decimal,

    /// Last traded price for the symbol, positive
    pub last_price: Decimal,
}
