// Session task - drives the engine from timers and user commands
//
// One task owns all scheduling: the 1 s live poll, the 100 ms replay tick, an
// optional status log, and the command channel. Every fetch (live poll, log load,
// sounding load) is held by the loop as an in-flight future, so a slow source never
// blocks the timers and shutdown drops whatever is still pending. At most one live
// poll is in flight; it is dropped (cancelled) whenever the mode changes.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::constants::{LIVE_POLL_INTERVAL, REPLAY_TICK_INTERVAL};
use crate::engine::{EngineSnapshot, Mode, ReplayTick, SyncEngine};
use crate::error::FetchError;
use crate::net::client::DataSource;
use crate::parse::{LiveReading, LogRecord, WeatherSample};
use crate::series::Quantity;

type Pending<T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send>>;

/// User-initiated actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMode,
    Pause,
    Resume,
    /// Re-fetch the historical log (and the sounding when the overlay is on)
    Reload,
    /// Enable (and fetch) or disable the weather overlay
    SetWeather(bool),
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["mode"] | ["toggle"] => Ok(Command::ToggleMode),
            ["pause"] => Ok(Command::Pause),
            ["resume"] => Ok(Command::Resume),
            ["reload"] => Ok(Command::Reload),
            ["weather", "on"] => Ok(Command::SetWeather(true)),
            ["weather", "off"] => Ok(Command::SetWeather(false)),
            _ => Err(format!("unknown command: {}", s.trim())),
        }
    }
}

/// Startup options
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Enter replay as soon as the session starts
    pub start_in_replay: bool,
    /// Enable the weather overlay at startup
    pub weather_overlay: bool,
    /// Period of the status log line; None disables it
    pub status_interval: Option<Duration>,
}

/// Periodic timer whose first tick is one period from now.
fn ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn in_flight<T>(slot: &mut Option<Pending<T>>) -> Result<T, FetchError> {
    match slot {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

/// Dataset loads outstanding in the loop
#[derive(Default)]
struct Loads {
    log: Option<Pending<Vec<LogRecord>>>,
    sounding: Option<Pending<Vec<WeatherSample>>>,
}

struct Session<S> {
    engine: Arc<RwLock<SyncEngine>>,
    source: Arc<S>,
    commands: mpsc::Receiver<Command>,
    shutdown_rx: mpsc::Receiver<()>,
    options: SessionOptions,
}

impl<S: DataSource> Session<S> {
    async fn run(mut self) {
        let mut loads = Loads { log: Some(self.fetch_log()), sounding: None };
        if self.options.weather_overlay {
            self.handle(Command::SetWeather(true), &mut loads).await;
        }
        if self.options.start_in_replay {
            // Playback starts once the log lands
            self.engine.write().await.toggle_mode(Instant::now());
        }

        let mut live_tick = ticker(LIVE_POLL_INTERVAL);
        let mut replay_tick = ticker(REPLAY_TICK_INTERVAL);
        let status_enabled = self.options.status_interval.is_some();
        let mut status_tick = ticker(self.options.status_interval.unwrap_or(Duration::from_secs(3600)));
        let mut live_poll: Option<Pending<LiveReading>> = None;

        loop {
            let mode = self.engine.read().await.mode();
            tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                cmd = self.commands.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle(cmd, &mut loads).await;
                    let now_mode = self.engine.read().await.mode();
                    if now_mode.is_replay() != mode.is_replay() {
                        if live_poll.take().is_some() {
                            debug!("Cancelled in-flight live poll");
                        }
                        live_tick = ticker(LIVE_POLL_INTERVAL);
                        replay_tick = ticker(REPLAY_TICK_INTERVAL);
                    }
                }
                result = in_flight(&mut live_poll), if live_poll.is_some() => {
                    live_poll = None;
                    self.apply_live(result).await;
                }
                result = in_flight(&mut loads.log), if loads.log.is_some() => {
                    loads.log = None;
                    self.apply_log(result).await;
                }
                result = in_flight(&mut loads.sounding), if loads.sounding.is_some() => {
                    loads.sounding = None;
                    self.apply_sounding(result).await;
                }
                _ = live_tick.tick(), if mode == Mode::Live => {
                    if live_poll.is_none() {
                        live_poll = Some(self.fetch_live());
                    } else {
                        debug!("Live poll still in flight, skipping tick");
                    }
                }
                _ = replay_tick.tick(), if mode.is_replay() => {
                    let tick = self.engine.write().await.replay_tick(Instant::now());
                    if let ReplayTick::Completed { .. } = tick {
                        live_tick = ticker(LIVE_POLL_INTERVAL);
                    }
                }
                _ = status_tick.tick(), if status_enabled => self.log_status().await,
            }
        }
        if loads.log.is_some() || loads.sounding.is_some() || live_poll.is_some() {
            debug!("Dropping pending fetches");
        }
        info!("Session stopped");
    }

    async fn handle(&self, cmd: Command, loads: &mut Loads) {
        debug!("Command: {:?}", cmd);
        let now = Instant::now();
        match cmd {
            Command::ToggleMode => {
                self.engine.write().await.toggle_mode(now);
            }
            Command::Pause => {
                if !self.engine.write().await.pause(now) {
                    debug!("Pause ignored: not replaying");
                }
            }
            Command::Resume => {
                if !self.engine.write().await.resume(now) {
                    debug!("Resume ignored: not paused");
                }
            }
            Command::Reload => {
                if loads.log.replace(self.fetch_log()).is_some() {
                    debug!("Superseded pending log load");
                }
                if self.engine.read().await.weather_overlay() {
                    loads.sounding = Some(self.fetch_sounding());
                }
            }
            Command::SetWeather(enabled) => {
                if !self.engine.write().await.set_weather_overlay(enabled) {
                    return;
                }
                if enabled {
                    loads.sounding = Some(self.fetch_sounding());
                } else if loads.sounding.take().is_some() {
                    debug!("Cancelled pending sounding load");
                }
            }
        }
    }

    fn fetch_live(&self) -> Pending<LiveReading> {
        let source = Arc::clone(&self.source);
        Box::pin(async move { source.fetch_live().await })
    }

    fn fetch_log(&self) -> Pending<Vec<LogRecord>> {
        let source = Arc::clone(&self.source);
        Box::pin(async move { source.fetch_log().await })
    }

    fn fetch_sounding(&self) -> Pending<Vec<WeatherSample>> {
        let source = Arc::clone(&self.source);
        Box::pin(async move { source.fetch_sounding().await })
    }

    async fn apply_live(&self, result: Result<LiveReading, FetchError>) {
        match result {
            Ok(reading) => {
                let admitted = self.engine.write().await.ingest_live(&reading, Instant::now());
                if admitted {
                    debug!("Live reading admitted: alt {:.1} m", reading.altitude);
                }
            }
            Err(e) => {
                warn!("Live fetch failed: {}", e);
                self.engine.write().await.record_live_failure(&e);
            }
        }
    }

    async fn apply_log(&self, result: Result<Vec<LogRecord>, FetchError>) {
        match result {
            Ok(records) => self.engine.write().await.install_log(records, Instant::now()),
            Err(e) => {
                error!("Error fetching log data: {}", e);
                self.engine.write().await.log_load_failed(Instant::now());
            }
        }
    }

    async fn apply_sounding(&self, result: Result<Vec<WeatherSample>, FetchError>) {
        match result {
            Ok(sounding) => {
                let mut engine = self.engine.write().await;
                if engine.weather_overlay() {
                    engine.install_sounding(sounding);
                }
            }
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                self.engine.write().await.sounding_load_failed();
            }
        }
    }

    async fn log_status(&self) {
        let engine = self.engine.read().await;
        let latest = engine.latest();
        info!(
            "Status: {:?}, {} samples buffered, alt {:.1} m, last reading '{}'{}",
            engine.mode(),
            engine.series().get(Quantity::Direction).len(),
            latest.altitude,
            latest.timestamp,
            engine.error().map(|e| format!(", error: {}", e)).unwrap_or_default(),
        );
    }
}

/// Handle to a running session task
pub struct SessionHandle {
    engine: Arc<RwLock<SyncEngine>>,
    commands: mpsc::Sender<Command>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Spawn the session task on the current runtime.
    pub fn spawn<S: DataSource>(source: S, options: SessionOptions) -> Self {
        let engine = Arc::new(RwLock::new(SyncEngine::new(Instant::now())));
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let session = Session {
            engine: Arc::clone(&engine),
            source: Arc::new(source),
            commands: cmd_rx,
            shutdown_rx,
            options,
        };
        let task = tokio::spawn(session.run());

        SessionHandle {
            engine,
            commands: cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Shared engine, for readers such as the HTTP endpoint.
    pub fn engine(&self) -> Arc<RwLock<SyncEngine>> {
        Arc::clone(&self.engine)
    }

    /// Queue a command. False when the session has stopped.
    pub async fn send(&self, cmd: Command) -> bool {
        self.commands.send(cmd).await.is_ok()
    }

    pub async fn toggle_mode(&self) -> bool {
        self.send(Command::ToggleMode).await
    }

    pub async fn pause(&self) -> bool {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> bool {
        self.send(Command::Resume).await
    }

    pub async fn reload(&self) -> bool {
        self.send(Command::Reload).await
    }

    pub async fn set_weather(&self, enabled: bool) -> bool {
        self.send(Command::SetWeather(enabled)).await
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.engine.read().await.snapshot()
    }

    /// Stop the task and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Session task failed: {}", e);
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
