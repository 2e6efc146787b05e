//! Display formatting and RSI classification. Pure functions, no I/O.

use crate::config::CHART_URL_PREFIX;
use crate::data::Numeric;

const PLACEHOLDER: &str = "-";
const CHART_QUOTE: &str = "USD";

/// Visual state of a single RSI reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsiClass {
    Neutral,
    Oversold,
    Overbought,
}

/// `$<billions>B` with two decimals, or `N/A` when the cap is unknown.
pub fn format_market_cap(mcap: Option<f64>) -> String {
    match mcap {
        Some(mcap) if mcap > 0.0 => format!("${:.2}B", mcap / 1_000_000_000.0),
        _ => "N/A".to_string(),
    }
}

/// Readings `<= 0` mean "not computable" and are always neutral. When the
/// limits overlap the oversold check wins.
pub fn classify_rsi(value: Option<f64>, oversold_limit: f64, overbought_limit: f64) -> RsiClass {
    match value {
        Some(v) if v > 0.0 => {
            if v <= oversold_limit {
                RsiClass::Oversold
            } else if v >= overbought_limit {
                RsiClass::Overbought
            } else {
                RsiClass::Neutral
            }
        }
        _ => RsiClass::Neutral,
    }
}

/// Shown as sent, numbers or not.
pub fn format_price(price: Option<&Numeric>) -> String {
    match price {
        Some(price) => format!("${price}"),
        None => format!("${PLACEHOLDER}"),
    }
}

pub fn format_rsi(value: Option<&Numeric>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

pub fn chart_url(symbol: &str) -> String {
    format!("{CHART_URL_PREFIX}{symbol}{CHART_QUOTE}")
}
