use chrono::{DateTime, Local, TimeDelta};
use log::{debug, warn};

use crate::app::poller::{PollerEvent, ScanTrigger};
use crate::app::watchlist::Mutation;
use crate::config::{
    NOTICE_DURATION_SECS, REFRESH_LABEL_BUSY, REFRESH_LABEL_IDLE, STATUS_ERROR, STATUS_FETCHING,
};
use crate::data::{Coin, Thresholds};
use crate::error::Result;
use crate::render::{RowView, render_rows};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Rows replaced with this many coins
    Applied(usize),
    /// Superseded by a later scan, dropped
    Stale,
    Failed,
}

/// Everything the dashboard shows, owned by the UI loop. The terminal layer
/// only reads from it and feeds it events.
#[derive(Debug)]
pub struct AppState {
    thresholds: Thresholds,
    coins: Vec<Coin>,
    rows: Vec<RowView>,
    status: String,
    /// Footer notice and the moment it was raised
    notice: Option<(String, DateTime<Local>)>,
    latest_seq: Option<u64>,
    in_flight: usize,
    /// Manual refresh sent, its `ScanStarted` not seen yet
    manual_pending: bool,
}

impl AppState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            coins: Vec::new(),
            rows: Vec::new(),
            status: String::new(),
            notice: None,
            latest_seq: None,
            in_flight: 0,
            manual_pending: false,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// The latest mutation notice, until it expires.
    pub fn notice(&self, now: DateTime<Local>) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, raised)| now - *raised < TimeDelta::seconds(NOTICE_DURATION_SECS))
            .map(|(text, _)| text.as_str())
    }

    pub fn refresh_enabled(&self) -> bool {
        self.in_flight == 0 && !self.manual_pending
    }

    /// Marks a manual refresh as requested. Returns false, and changes
    /// nothing, while the control is disabled.
    pub fn request_refresh(&mut self) -> bool {
        if !self.refresh_enabled() {
            return false;
        }
        self.manual_pending = true;
        true
    }

    pub fn refresh_label(&self) -> &'static str {
        if self.refresh_enabled() {
            REFRESH_LABEL_IDLE
        } else {
            REFRESH_LABEL_BUSY
        }
    }

    pub fn on_event(&mut self, event: PollerEvent, now: DateTime<Local>) {
        match event {
            PollerEvent::ScanStarted { seq, trigger } => self.begin_scan(seq, trigger),
            PollerEvent::ScanFinished { seq, result } => {
                self.complete_scan(seq, result, now);
            }
            PollerEvent::MutationFinished(mutation) => self.on_mutation(&mutation, now),
        }
    }

    pub fn begin_scan(&mut self, seq: u64, trigger: ScanTrigger) {
        debug!("Scan #{} started ({:?})", seq, trigger);
        self.latest_seq = Some(seq);
        self.in_flight += 1;
        if trigger == ScanTrigger::Manual {
            self.manual_pending = false;
        }
        self.status = STATUS_FETCHING.to_string();
    }

    pub fn complete_scan(
        &mut self,
        seq: u64,
        result: Result<Vec<Coin>>,
        now: DateTime<Local>,
    ) -> ScanOutcome {
        // Runs on every path so the refresh control cannot stay disabled
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.latest_seq != Some(seq) {
            debug!(
                "Dropping scan #{} response, latest is {:?}",
                seq, self.latest_seq
            );
            return ScanOutcome::Stale;
        }

        match result {
            Ok(coins) => {
                let count = coins.len();
                self.coins = coins;
                self.rerender();
                self.status = format!(
                    "Last updated: {} | Found {} coins",
                    now.format("%H:%M:%S"),
                    count
                );
                ScanOutcome::Applied(count)
            }
            Err(e) => {
                warn!("Scan #{} failed: {}", seq, e);
                self.status = STATUS_ERROR.to_string();
                ScanOutcome::Failed
            }
        }
    }

    pub fn on_mutation(&mut self, mutation: &Mutation, now: DateTime<Local>) {
        if let Some(notice) = mutation.notice() {
            self.notice = Some((notice, now));
        }
    }

    /// Takes effect on the next scan; filtering happens server-side.
    pub fn set_min_mcap(&mut self, min_mcap: f64) {
        self.thresholds.min_mcap = min_mcap;
    }

    pub fn set_oversold_limit(&mut self, limit: f64) {
        self.thresholds.oversold_limit = limit;
        self.rerender();
    }

    pub fn set_overbought_limit(&mut self, limit: f64) {
        self.thresholds.overbought_limit = limit;
        self.rerender();
    }

    fn rerender(&mut self) {
        self.rows = render_rows(&self.coins, &self.thresholds);
    }
}
