use crate::config::Settings;

/// User-adjustable filter and classification limits. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Minimum market cap in billions; applied server-side.
    pub min_mcap: f64,
    pub oversold_limit: f64,
    pub overbought_limit: f64,
}

impl From<&Settings> for Thresholds {
    fn from(settings: &Settings) -> Self {
        Self {
            min_mcap: settings.min_mcap,
            oversold_limit: settings.oversold_limit,
            overbought_limit: settings.overbought_limit,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}
