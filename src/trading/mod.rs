//! Trading logic: risk configuration and the decision policy.

mod config;
mod policy;

pub use config::RiskConfig;
pub use policy::{Decision, DecisionEngine, HoldReason};
