//! Data models for bars, signals, account state, and orders.

mod account;
mod bar;
mod order;
mod signal;

pub use account::AccountSnapshot;
pub use bar::{close_returns, Bar};
pub use order::{OrderAck, OrderIntent, OrderSide};
pub use signal::{SentimentLabel, Signal};
