pub mod poller;
pub mod state;
pub mod watchlist;

use std::sync::Arc;

use color_eyre::Result;
use log::{error, info};
use tokio::sync::{mpsc, watch};

use crate::app::poller::{Command, Poller, PollerEvent};
use crate::app::state::AppState;
use crate::config::{SCAN_INTERVAL, Settings};
use crate::data::Thresholds;
use crate::request::{ScannerApi, ScannerClient};
use crate::ui::TuiApp;

#[derive(Debug, Clone)]
pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub async fn run(&self) -> Result<()> {
        let api: Arc<dyn ScannerApi> = Arc::new(ScannerClient::new(&self.settings.base_url)?);
        let thresholds = Thresholds::from(&self.settings);
        info!(
            "Scanning {} every {:?}, thresholds {:?}",
            self.settings.base_url, SCAN_INTERVAL, thresholds
        );

        // UI -> poller
        let (command_tx, command_rx) = mpsc::unbounded_channel::<Command>();
        // Poller -> UI
        let (event_tx, event_rx) = mpsc::unbounded_channel::<PollerEvent>();
        // Current min mcap, read by the poller when a scan starts
        let (min_mcap_tx, min_mcap_rx) = watch::channel(thresholds.min_mcap);

        let poller = Poller::new(api, min_mcap_rx, command_rx, event_tx, SCAN_INTERVAL);
        let poller_task = tokio::spawn(poller.run());

        let ui_task = tokio::task::spawn_blocking(move || {
            let terminal = ratatui::init();
            let app = TuiApp::new(AppState::new(thresholds), command_tx, min_mcap_tx);
            let app_result = app.run(terminal, event_rx);
            ratatui::restore();
            app_result
        });

        // Wait for UI to finish (user quits)
        let ui_result = ui_task.await;

        // The UI dropped its command sender, but in-flight requests may linger
        poller_task.abort();

        match ui_result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("UI exited with error: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("UI task panicked: {}", e);
                Err(e.into())
            }
        }
    }
}
