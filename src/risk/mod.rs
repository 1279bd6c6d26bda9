//! Risk estimation: volatility, tail risk, regime detection, sizing.

mod regime;
mod sizer;
mod tail;
mod volatility;

pub use regime::compute_turbulence;
pub use sizer::{PositionSizer, SizingResult};
pub use tail::{compute_cvar, compute_var};
pub use volatility::compute_atr;
