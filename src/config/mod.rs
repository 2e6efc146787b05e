use std::time::Duration;

use ratatui::style::palette::tailwind;

use crate::error::ScannerError;

pub const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];

pub const INFO_TEXT: [&str; 2] = [
    "(Esc) quit | (↑/↓) move row | (r) scan | (a) add | (x) remove",
    "(m) min mcap | (o) oversold | (b) overbought | (c/C) cycle color",
];

pub const ITEM_HEIGHT: usize = 1;
pub const POLL_DURATION_MS: u64 = 50;
pub const ERROR_POPUP_DURATION_MS: u64 = 1500;
pub const NOTICE_DURATION_SECS: i64 = 10;

/// Fixed period of the automatic scan.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(180);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const LOG_PATH: &str = "/tmp/rsi_scanner.log";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_MIN_MCAP: f64 = 0.0;
pub const DEFAULT_OVERSOLD_LIMIT: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT_LIMIT: f64 = 70.0;

pub const CHART_URL_PREFIX: &str = "https://www.tradingview.com/chart/?symbol=";

// Status bar and refresh control texts
pub const STATUS_FETCHING: &str = "Fetching market data (this may take ~20s)...";
pub const STATUS_ERROR: &str = "Error fetching data.";
pub const REFRESH_LABEL_IDLE: &str = "SCAN MARKET";
pub const REFRESH_LABEL_BUSY: &str = "Scanning...";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub min_mcap: f64,
    pub oversold_limit: f64,
    pub overbought_limit: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_mcap: DEFAULT_MIN_MCAP,
            oversold_limit: DEFAULT_OVERSOLD_LIMIT,
            overbought_limit: DEFAULT_OVERBOUGHT_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ScannerError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults
    /// for every key that is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |key: &str, default: f64| -> Result<f64, ScannerError> {
            match lookup(key) {
                Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                    ScannerError::Config(format!("{key} is not a number: {raw:?}"))
                }),
                None => Ok(default),
            }
        };

        let base_url = lookup("SCANNER_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        Ok(Self {
            base_url,
            min_mcap: number("SCANNER_MIN_MCAP", defaults.min_mcap)?,
            oversold_limit: number("SCANNER_OVERSOLD", defaults.oversold_limit)?,
            overbought_limit: number("SCANNER_OVERBOUGHT", defaults.overbought_limit)?,
        })
    }
}
