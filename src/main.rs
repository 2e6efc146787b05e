//! RSI scanner dashboard
//!
//! Live table of Coin | Price | Market Cap | RSI 15m/1h/4h/1D, colored by
//! oversold/overbought limits. Polls the scanner backend every three minutes
//! and on demand; coins are added to and removed from its watchlist from here.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod request;
pub mod ui;

use crate::app::App;
use crate::config::Settings;
use color_eyre::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();

    let settings = Settings::from_env()?;
    let app = App::new(settings);
    app.run().await
}
