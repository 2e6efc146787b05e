use std::fmt;

use serde::Deserialize;

/// A numeric field as the backend sent it. Anything that is not a JSON number
/// is kept verbatim for display instead of failing the whole scan.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Raw(serde_json::Value),
}

impl Numeric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Raw(_) => None,
        }
    }
}

impl From<f64> for Numeric {
    fn from(n: f64) -> Self {
        Numeric::Number(n)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Number(n) => write!(f, "{n}"),
            Numeric::Raw(serde_json::Value::String(s)) => f.write_str(s),
            Numeric::Raw(other) => write!(f, "{other}"),
        }
    }
}

/// One element of the scan response. Replaced wholesale on every applied scan.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Coin {
    /// Watchlist key, e.g. `BTC-USD`
    #[serde(default)]
    pub ticker: String,
    /// Display name, e.g. `BTC`
    #[serde(default)]
    pub symbol: String,
    pub price: Option<Numeric>,
    pub mcap: Option<Numeric>,
    pub rsi_15m: Option<Numeric>,
    pub rsi_1h: Option<Numeric>,
    pub rsi_4h: Option<Numeric>,
    pub rsi_1d: Option<Numeric>,
}

impl Coin {
    /// RSI readings ordered by timeframe: 15m, 1h, 4h, 1d.
    pub fn rsi_readings(&self) -> [Option<&Numeric>; 4] {
        [
            self.rsi_15m.as_ref(),
            self.rsi_1h.as_ref(),
            self.rsi_4h.as_ref(),
            self.rsi_1d.as_ref(),
        ]
    }

    /// Market cap when the backend sent a number.
    pub fn mcap_value(&self) -> Option<f64> {
        self.mcap.as_ref().and_then(Numeric::value)
    }
}
