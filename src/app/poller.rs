//! Scan scheduling: initial load, fixed timer, manual and post-mutation
//! refreshes. Every scan carries a sequence number so the UI can drop
//! responses that were overtaken by a later request.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::app::watchlist::{Mutation, add_coin, remove_coin};
use crate::data::Coin;
use crate::error::Result;
use crate::request::ScannerApi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanTrigger {
    Initial,
    Timer,
    Manual,
    Mutation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    /// Raw input, validated by the mutator
    Add(String),
    /// Ticker of a confirmed row removal
    Remove(String),
}

#[derive(Debug)]
pub enum PollerEvent {
    ScanStarted { seq: u64, trigger: ScanTrigger },
    ScanFinished { seq: u64, result: Result<Vec<Coin>> },
    MutationFinished(Mutation),
}

pub struct Poller {
    api: Arc<dyn ScannerApi>,
    min_mcap: watch::Receiver<f64>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<PollerEvent>,
    period: Duration,
    next_seq: u64,
    scans: JoinSet<(u64, Result<Vec<Coin>>)>,
    mutations: JoinSet<Mutation>,
}

impl Poller {
    pub fn new(
        api: Arc<dyn ScannerApi>,
        min_mcap: watch::Receiver<f64>,
        commands: mpsc::UnboundedReceiver<Command>,
        events: mpsc::UnboundedSender<PollerEvent>,
        period: Duration,
    ) -> Self {
        Self {
            api,
            min_mcap,
            commands,
            events,
            period,
            next_seq: 0,
            scans: JoinSet::new(),
            mutations: JoinSet::new(),
        }
    }

    /// Runs until the command channel closes (the UI quit).
    pub async fn run(mut self) {
        self.start_scan(ScanTrigger::Initial);

        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = timer.tick() => self.start_scan(ScanTrigger::Timer),
                Some(joined) = self.scans.join_next() => match joined {
                    Ok((seq, result)) => {
                        self.emit(PollerEvent::ScanFinished { seq, result });
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => error!("Scan task died: {}", e),
                },
                Some(joined) = self.mutations.join_next() => match joined {
                    Ok(mutation) => {
                        if mutation.attempted() {
                            self.emit(PollerEvent::MutationFinished(mutation));
                            // Refresh regardless of outcome
                            self.start_scan(ScanTrigger::Mutation);
                        } else {
                            debug!("Skipped empty add");
                        }
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => error!("Watchlist task died: {}", e),
                },
            }
        }

        info!("Poller stopped");
        self.scans.abort_all();
        self.mutations.abort_all();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Refresh => self.start_scan(ScanTrigger::Manual),
            Command::Add(input) => {
                let api = Arc::clone(&self.api);
                self.mutations
                    .spawn(async move { add_coin(api.as_ref(), &input).await });
            }
            Command::Remove(ticker) => {
                let api = Arc::clone(&self.api);
                self.mutations
                    .spawn(async move { remove_coin(api.as_ref(), &ticker).await });
            }
        }
    }

    fn start_scan(&mut self, trigger: ScanTrigger) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let min_mcap = *self.min_mcap.borrow();
        info!("Scan #{} ({:?}) min_mcap={}", seq, trigger, min_mcap);

        self.emit(PollerEvent::ScanStarted { seq, trigger });

        let api = Arc::clone(&self.api);
        self.scans
            .spawn(async move { (seq, api.scan(min_mcap).await) });
    }

    fn emit(&self, event: PollerEvent) {
        if self.events.send(event).is_err() {
            debug!("UI gone, dropping poller event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::watchlist::{MutationKind, MutationOutcome};
    use crate::request::ScannerClient;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate, Times};

    const LONG_PERIOD: Duration = Duration::from_secs(3600);

    struct Harness {
        commands: mpsc::UnboundedSender<Command>,
        events: mpsc::UnboundedReceiver<PollerEvent>,
        min_mcap: watch::Sender<f64>,
        task: tokio::task::JoinHandle<()>,
    }

    fn spawn_poller(base_url: String, period: Duration) -> Harness {
        let api: Arc<dyn ScannerApi> = Arc::new(ScannerClient::new(base_url).unwrap());
        let (min_mcap_tx, min_mcap_rx) = watch::channel(0.0);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let poller = Poller::new(api, min_mcap_rx, command_rx, event_tx, period);
        Harness {
            commands: command_tx,
            events: event_rx,
            min_mcap: min_mcap_tx,
            task: tokio::spawn(poller.run()),
        }
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<PollerEvent>) -> PollerEvent {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("poller event within 5s")
            .expect("poller still running")
    }

    async fn mount_scan(server: &MockServer, expected: impl Into<Times>) {
        Mock::given(method("GET"))
            .and(path("/api/scan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"symbol": "BTC", "ticker": "BTC-USD", "price": 1.0, "mcap": 1e12,
                 "rsi_15m": 20, "rsi_1h": 50, "rsi_4h": 50, "rsi_1d": 80}
            ])))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_initial_scan_on_start() {
        let server = MockServer::start().await;
        mount_scan(&server, 1u64).await;
        let mut h = spawn_poller(server.uri(), LONG_PERIOD);

        match next_event(&mut h.events).await {
            PollerEvent::ScanStarted { seq, trigger } => {
                assert_eq!(seq, 1);
                assert_eq!(trigger, ScanTrigger::Initial);
            }
            other => panic!("unexpected {other:?}"),
        }
        match next_event(&mut h.events).await {
            PollerEvent::ScanFinished { seq, result } => {
                assert_eq!(seq, 1);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }

        drop(h.commands);
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_manual_refresh_uses_current_min_mcap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/scan"))
            .and(query_param("min_mcap", "2.5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        mount_scan(&server, 1u64).await;
        let mut h = spawn_poller(server.uri(), LONG_PERIOD);

        // Initial start + finish
        next_event(&mut h.events).await;
        next_event(&mut h.events).await;

        h.min_mcap.send(2.5).unwrap();
        h.commands.send(Command::Refresh).unwrap();

        match next_event(&mut h.events).await {
            PollerEvent::ScanStarted { seq, trigger } => {
                assert_eq!(seq, 2);
                assert_eq!(trigger, ScanTrigger::Manual);
            }
            other => panic!("unexpected {other:?}"),
        }
        match next_event(&mut h.events).await {
            PollerEvent::ScanFinished { seq, result } => {
                assert_eq!(seq, 2);
                assert!(result.unwrap().is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }

        drop(h.commands);
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_confirmed_remove_posts_once_then_refreshes_once() {
        let server = MockServer::start().await;
        // Initial scan plus exactly one follow-up
        mount_scan(&server, 2u64).await;
        Mock::given(method("POST"))
            .and(path("/api/remove"))
            .and(body_json(json!({"ticker": "BTC-USD"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let mut h = spawn_poller(server.uri(), LONG_PERIOD);
        next_event(&mut h.events).await;
        next_event(&mut h.events).await;

        h.commands.send(Command::Remove("BTC-USD".to_string())).unwrap();

        match next_event(&mut h.events).await {
            PollerEvent::MutationFinished(mutation) => {
                assert_eq!(mutation.kind, MutationKind::Remove);
                assert_eq!(mutation.outcome, MutationOutcome::Succeeded);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            next_event(&mut h.events).await,
            PollerEvent::ScanStarted { seq: 2, trigger: ScanTrigger::Mutation }
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            PollerEvent::ScanFinished { seq: 2, .. }
        ));

        drop(h.commands);
        h.task.await.unwrap();
        server.verify().await;
    }

    #[tokio::test]
    async fn test_failed_add_still_refreshes() {
        let server = MockServer::start().await;
        mount_scan(&server, 2u64).await;
        Mock::given(method("POST"))
            .and(path("/api/add"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let mut h = spawn_poller(server.uri(), LONG_PERIOD);
        next_event(&mut h.events).await;
        next_event(&mut h.events).await;

        h.commands.send(Command::Add("NOPE-USD".to_string())).unwrap();

        match next_event(&mut h.events).await {
            PollerEvent::MutationFinished(mutation) => {
                assert!(matches!(mutation.outcome, MutationOutcome::Failed(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            next_event(&mut h.events).await,
            PollerEvent::ScanStarted { trigger: ScanTrigger::Mutation, .. }
        ));
        next_event(&mut h.events).await;

        drop(h.commands);
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_add_neither_posts_nor_refreshes() {
        let server = MockServer::start().await;
        mount_scan(&server, 1u64).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let mut h = spawn_poller(server.uri(), LONG_PERIOD);
        next_event(&mut h.events).await;
        next_event(&mut h.events).await;

        h.commands.send(Command::Add("  ".to_string())).unwrap();
        let quiet = tokio::time::timeout(Duration::from_millis(300), h.events.recv()).await;
        assert!(quiet.is_err(), "no event expected for an empty add");

        drop(h.commands);
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_timer_triggers_scan() {
        let server = MockServer::start().await;
        mount_scan(&server, 2u64..).await;
        let mut h = spawn_poller(server.uri(), Duration::from_millis(200));
        next_event(&mut h.events).await;
        next_event(&mut h.events).await;

        match next_event(&mut h.events).await {
            PollerEvent::ScanStarted { seq, trigger } => {
                assert_eq!(seq, 2);
                assert_eq!(trigger, ScanTrigger::Timer);
            }
            other => panic!("unexpected {other:?}"),
        }

        drop(h.commands);
        h.task.await.unwrap();
    }
}
