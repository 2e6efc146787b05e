mod coin_data;
mod thresholds;

pub use coin_data::{Coin, Numeric};
pub use thresholds::Thresholds;
