// Sync engine - mode state machine and fan-out into the windows
//
// Owns the six windows, the latest-reading panel, the surfaced error, the loaded
// datasets and the active time source. Everything is synchronous and takes `now`
// explicitly; the session task decides when to call in.

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::clock::{LiveClock, ReplaySource, TimeSource};
use crate::constants::{altitude_in_band, ALT_MAX, ALT_MIN, REPLAY_TIME_FACTOR};
use crate::error::FetchError;
use crate::parse::{LiveReading, LogRecord, WeatherSample};
use crate::reading::{LatestReading, Measurement};
use crate::series::{Quantity, Sample, SeriesSet};
use crate::store::LogStore;

/// Sub-state of replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    Running,
    Paused,
}

/// Engine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Live,
    Replay(ReplayState),
}

impl Mode {
    pub fn is_replay(self) -> bool {
        matches!(self, Mode::Replay(_))
    }

    pub fn is_paused(self) -> bool {
        self == Mode::Replay(ReplayState::Paused)
    }
}

/// Outcome of one replay tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayTick {
    /// Not replaying, paused, or nothing loaded
    Idle,
    /// `drained` records consumed, `admitted` of them passed the altitude gate
    Advanced { drained: usize, admitted: usize },
    /// Log exhausted; the engine is back in live mode
    Completed { drained: usize, admitted: usize },
}

/// Ordered copies of the six windows
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesSnapshot {
    pub vertical_speed: Vec<Sample>,
    pub acceleration: Vec<Sample>,
    pub direction: Vec<Sample>,
    pub speed: Vec<Sample>,
    pub temperature: Vec<Sample>,
    pub humidity: Vec<Sample>,
}

impl SeriesSnapshot {
    fn capture(series: &SeriesSet) -> Self {
        SeriesSnapshot {
            vertical_speed: series.get(Quantity::VerticalSpeed).snapshot(),
            acceleration: series.get(Quantity::Acceleration).snapshot(),
            direction: series.get(Quantity::Direction).snapshot(),
            speed: series.get(Quantity::Speed).snapshot(),
            temperature: series.get(Quantity::Temperature).snapshot(),
            humidity: series.get(Quantity::Humidity).snapshot(),
        }
    }

    pub fn get(&self, quantity: Quantity) -> &[Sample] {
        match quantity {
            Quantity::VerticalSpeed => &self.vertical_speed,
            Quantity::Acceleration => &self.acceleration,
            Quantity::Direction => &self.direction,
            Quantity::Speed => &self.speed,
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
        }
    }
}

/// Read-only view handed to the render layer
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub is_replay: bool,
    pub is_paused: bool,
    pub latest: LatestReading,
    pub error: Option<String>,
    pub weather_overlay: bool,
    pub altitude_min: f64,
    pub altitude_max: f64,
    pub log_records: usize,
    /// Records consumed by the running replay
    pub replay_position: Option<usize>,
    pub series: SeriesSnapshot,
    /// Sounding levels (empty while the overlay is off)
    pub sounding: Vec<WeatherSample>,
}

/// The synchronisation engine
#[derive(Debug)]
pub struct SyncEngine {
    source: TimeSource,
    series: SeriesSet,
    latest: LatestReading,
    error: Option<String>,
    store: LogStore,
    weather_overlay: bool,
}

impl SyncEngine {
    /// New engine in live mode.
    pub fn new(now: Instant) -> Self {
        SyncEngine {
            source: TimeSource::Live(LiveClock::start(now)),
            series: SeriesSet::new(),
            latest: LatestReading::default(),
            error: None,
            store: LogStore::default(),
            weather_overlay: false,
        }
    }

    pub fn mode(&self) -> Mode {
        match &self.source {
            TimeSource::Live(_) => Mode::Live,
            TimeSource::Replay(r) if r.paused => Mode::Replay(ReplayState::Paused),
            TimeSource::Replay(_) => Mode::Replay(ReplayState::Running),
        }
    }

    /// Live <-> Replay. Clears the windows, the panel and the error.
    pub fn toggle_mode(&mut self, now: Instant) -> Mode {
        self.source = match self.source {
            TimeSource::Live(_) => TimeSource::Replay(ReplaySource::start(
                self.store.records(),
                REPLAY_TIME_FACTOR,
                now,
                false,
            )),
            TimeSource::Replay(_) => TimeSource::Live(LiveClock::start(now)),
        };
        self.series.reset();
        self.latest = LatestReading::default();
        self.error = None;
        let mode = self.mode();
        info!("Mode switched to {:?} ({} log records)", mode, self.store.records().len());
        mode
    }

    /// Replay.Running -> Replay.Paused; false (no-op) from any other state.
    pub fn pause(&mut self, now: Instant) -> bool {
        match &mut self.source {
            TimeSource::Replay(r) if !r.paused => {
                r.paused = true;
                if let Some(clock) = r.clock.as_mut() {
                    clock.pause(now);
                }
                info!("Replay paused at record {}", r.cursor.position());
                true
            }
            _ => false,
        }
    }

    /// Replay.Paused -> Replay.Running; false (no-op) from any other state.
    pub fn resume(&mut self, now: Instant) -> bool {
        match &mut self.source {
            TimeSource::Replay(r) if r.paused => {
                r.paused = false;
                if let Some(clock) = r.clock.as_mut() {
                    clock.resume(now);
                }
                info!("Replay resumed at record {}", r.cursor.position());
                true
            }
            _ => false,
        }
    }

    /// Offer a polled live reading. Returns true when it was admitted.
    ///
    /// Readings are silently discarded outside live mode, when any field is NaN, or
    /// when the altitude is outside the band.
    pub fn ingest_live(&mut self, reading: &LiveReading, now: Instant) -> bool {
        let TimeSource::Live(clock) = &self.source else {
            debug!("Discarding live reading outside live mode");
            return false;
        };
        if !reading.is_admissible() {
            if reading.is_well_formed() {
                warn!("Altitude {} out of range [{}, {}]", reading.altitude, ALT_MIN, ALT_MAX);
            } else {
                warn!("Invalid live data received: {:?}", reading);
            }
            return false;
        }

        let measurement = Measurement::from_live(reading, clock.elapsed_secs(now));
        self.admit(&measurement);
        self.error = None;
        true
    }

    /// Record a failed live poll as the surfaced error.
    pub fn record_live_failure(&mut self, err: &FetchError) {
        if self.mode() == Mode::Live {
            self.error = Some(format!("Failed to fetch live data: {}", err));
        }
    }

    /// Drain every record whose runtime is due on the virtual clock.
    pub fn replay_tick(&mut self, now: Instant) -> ReplayTick {
        let store = self.store.clone();
        let records = store.records();

        let (due, exhausted) = match &mut self.source {
            TimeSource::Replay(r) if !r.paused => {
                let Some(clock) = r.clock.as_ref() else {
                    return ReplayTick::Idle;
                };
                let simulated = clock.simulated_time(now);
                let due = r.cursor.drain(records, simulated);
                debug!("Replay index: {}, simulated time: {:.1}", r.cursor.position(), simulated);
                (due, r.cursor.is_exhausted(records.len()))
            }
            _ => return ReplayTick::Idle,
        };

        let mut admitted = 0;
        for record in due {
            if altitude_in_band(record.baro_altitude) {
                self.admit(&Measurement::from_record(record));
                admitted += 1;
            }
        }

        if exhausted {
            info!("Replay completed ({} records)", records.len());
            self.source = TimeSource::Live(LiveClock::start(now));
            ReplayTick::Completed { drained: due.len(), admitted }
        } else {
            ReplayTick::Advanced { drained: due.len(), admitted }
        }
    }

    fn admit(&mut self, measurement: &Measurement) {
        measurement.fan_out(&mut self.series);
        self.latest = LatestReading::from(measurement);
        debug!(
            "Sample t={:.1} alt={:.1} ({} direction samples)",
            measurement.time,
            measurement.altitude,
            self.series.get(Quantity::Direction).len()
        );
    }

    /// Swap in a freshly loaded log. A running replay restarts on the new log.
    pub fn install_log(&mut self, records: Vec<LogRecord>, now: Instant) {
        self.store = self.store.with_records(records);
        self.error = None;
        if let TimeSource::Replay(ReplaySource { paused, .. }) = self.source {
            self.source = TimeSource::Replay(ReplaySource::start(
                self.store.records(),
                REPLAY_TIME_FACTOR,
                now,
                paused,
            ));
        }
        info!("Log loaded: {} records", self.store.records().len());
    }

    /// The log could not be fetched: empty log, surfaced error.
    pub fn log_load_failed(&mut self, now: Instant) {
        self.install_log(Vec::new(), now);
        self.error = Some("Failed to fetch log data.".to_string());
    }

    pub fn install_sounding(&mut self, sounding: Vec<WeatherSample>) {
        info!("Sounding loaded: {} levels", sounding.len());
        self.store = self.store.with_sounding(sounding);
        self.error = None;
    }

    /// The sounding could not be fetched: empty sounding, surfaced error.
    pub fn sounding_load_failed(&mut self) {
        self.store = self.store.with_sounding(Vec::new());
        self.error = Some("Failed to fetch weather data.".to_string());
    }

    /// Enable or disable the weather overlay. Disabling drops the sounding.
    /// Returns true when the flag changed.
    pub fn set_weather_overlay(&mut self, enabled: bool) -> bool {
        if self.weather_overlay == enabled {
            return false;
        }
        self.weather_overlay = enabled;
        if !enabled {
            self.store = self.store.with_sounding(Vec::new());
        }
        true
    }

    pub fn weather_overlay(&self) -> bool {
        self.weather_overlay
    }

    pub fn series(&self) -> &SeriesSet {
        &self.series
    }

    pub fn latest(&self) -> &LatestReading {
        &self.latest
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Records consumed by the current replay, None in live mode.
    pub fn replay_position(&self) -> Option<usize> {
        match &self.source {
            TimeSource::Replay(r) => Some(r.cursor.position()),
            TimeSource::Live(_) => None,
        }
    }

    /// Consistent copy of everything the render layer needs.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mode = self.mode();
        EngineSnapshot {
            mode,
            is_replay: mode.is_replay(),
            is_paused: mode.is_paused(),
            latest: self.latest.clone(),
            error: self.error.clone(),
            weather_overlay: self.weather_overlay,
            altitude_min: ALT_MIN,
            altitude_max: ALT_MAX,
            log_records: self.store.records().len(),
            replay_position: self.replay_position(),
            series: SeriesSnapshot::capture(&self.series),
            sounding: self.store.sounding().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::messages::LiveMessage;
    use crate::parse::parse_log;
    use tokio::time::Duration;

    fn log(n: usize, alt: f64) -> Vec<LogRecord> {
        let text: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"Runtime":{i},"Baro_Alt_m":{alt},"Date":"2025-05-04","Time":"t{i}"}}"#))
            .collect();
        parse_log(&text.join("\n"))
    }

    fn live(json: &str) -> LiveReading {
        let msg: LiveMessage = serde_json::from_str(json).unwrap();
        LiveReading::from_message(&msg)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_state() {
        let engine = SyncEngine::new(Instant::now());
        assert_eq!(engine.mode(), Mode::Live);
        assert!(engine.series().is_empty());
        assert!(engine.error().is_none());
        assert_eq!(engine.replay_position(), None);
    }

    #[test]
    fn test_toggle_twice_returns_to_live_and_clears() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(5, 100.0), t);
        assert!(engine.ingest_live(&live(r#"{"calt":"200"}"#), t));
        assert!(!engine.series().is_empty());

        assert_eq!(engine.toggle_mode(t), Mode::Replay(ReplayState::Running));
        assert!(engine.series().is_empty());
        assert_eq!(engine.latest(), &LatestReading::default());

        engine.replay_tick(t + ms(100));
        assert!(!engine.series().is_empty());

        assert_eq!(engine.toggle_mode(t + ms(200)), Mode::Live);
        assert!(engine.series().is_empty());
        assert_eq!(engine.latest().timestamp, "");
    }

    #[test]
    fn test_toggle_clears_error() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.record_live_failure(&FetchError::Status(500));
        assert_eq!(engine.error(), Some("Failed to fetch live data: HTTP error 500"));
        engine.toggle_mode(t);
        assert!(engine.error().is_none());
    }

    #[test]
    fn test_pause_resume_only_in_replay() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        assert!(!engine.pause(t));
        assert!(!engine.resume(t));
        assert_eq!(engine.mode(), Mode::Live);

        engine.toggle_mode(t);
        assert!(!engine.resume(t));
        assert!(engine.pause(t));
        assert!(!engine.pause(t));
        assert_eq!(engine.mode(), Mode::Replay(ReplayState::Paused));
        assert!(engine.resume(t));
        assert_eq!(engine.mode(), Mode::Replay(ReplayState::Running));
    }

    #[test]
    fn test_replay_drains_by_virtual_time() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(25, 100.0), t);
        engine.toggle_mode(t);

        let tick = engine.replay_tick(t + ms(1300));
        assert_eq!(tick, ReplayTick::Advanced { drained: 14, admitted: 14 });
        assert_eq!(engine.replay_position(), Some(14));
        assert_eq!(engine.series().get(Quantity::Temperature).len(), 14);
        assert_eq!(engine.latest().timestamp, "2025-05-04 t13");
        // Acceleration window capacity is 60, so nothing is evicted yet
        assert_eq!(engine.series().get(Quantity::Acceleration).len(), 14);
    }

    #[test]
    fn test_pause_freezes_virtual_clock() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(25, 100.0), t);
        engine.toggle_mode(t);

        engine.replay_tick(t + ms(1000));
        assert_eq!(engine.replay_position(), Some(11));
        engine.pause(t + ms(1000));
        assert_eq!(engine.replay_tick(t + ms(2000)), ReplayTick::Idle);

        engine.resume(t + ms(3000));
        engine.replay_tick(t + ms(3000));
        assert_eq!(engine.replay_position(), Some(11));

        // 200 ms more running = 2 virtual seconds
        engine.replay_tick(t + ms(3200));
        assert_eq!(engine.replay_position(), Some(13));
    }

    #[test]
    fn test_replay_completion_returns_to_live_keeping_buffers() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(5, 100.0), t);
        engine.toggle_mode(t);

        let tick = engine.replay_tick(t + ms(1000));
        assert_eq!(tick, ReplayTick::Completed { drained: 5, admitted: 5 });
        assert_eq!(engine.mode(), Mode::Live);
        assert_eq!(engine.series().get(Quantity::Speed).len(), 5);
        assert_eq!(engine.latest().timestamp, "2025-05-04 t4");
    }

    #[test]
    fn test_replay_gate_skips_out_of_band_records() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        let mut records = log(3, 100.0);
        records.extend(parse_log(r#"{"Runtime":1.5,"Baro_Alt_m":1800}"#));
        engine.install_log(records, t);
        engine.toggle_mode(t);

        let tick = engine.replay_tick(t + ms(100));
        assert_eq!(tick, ReplayTick::Advanced { drained: 2, admitted: 2 });
        let tick = engine.replay_tick(t + ms(150));
        // 1.5 (out of band) is consumed but not admitted
        assert_eq!(tick, ReplayTick::Advanced { drained: 1, admitted: 0 });
        assert_eq!(engine.series().get(Quantity::Direction).len(), 2);
    }

    #[test]
    fn test_replay_with_empty_log_is_idle() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.toggle_mode(t);
        assert_eq!(engine.replay_tick(t + ms(5000)), ReplayTick::Idle);
        assert_eq!(engine.mode(), Mode::Replay(ReplayState::Running));

        // A log arriving later starts playback from its first record
        engine.install_log(log(25, 100.0), t + ms(5000));
        engine.replay_tick(t + ms(5100));
        assert_eq!(engine.replay_position(), Some(2));
    }

    #[test]
    fn test_live_gate() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        assert!(!engine.ingest_live(&live(r#"{"calt":"2000","tbt":"20"}"#), t));
        assert!(engine.series().is_empty());
        assert_eq!(engine.latest(), &LatestReading::default());

        let mut reading = live(r#"{"calt":"500"}"#);
        reading.humidity = f64::NAN;
        assert!(!engine.ingest_live(&reading, t));
        assert!(engine.series().is_empty());
    }

    #[test]
    fn test_live_elapsed_time_and_error_clear() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.record_live_failure(&FetchError::Status(404));
        assert!(engine.error().is_some());

        assert!(engine.ingest_live(&live(r#"{"calt":"640","gpsAngle":"45","gpsYear":"25","gpsMon":"5","gpsDay":"4","gpsStd":"9","gpsMin":"0","gpsSek":"1"}"#), t + ms(3000)));
        assert!(engine.error().is_none());
        let dir = engine.series().get(Quantity::Direction).snapshot();
        assert_eq!(dir[0], Sample { time: 3.0, value: 45.0, altitude: Some(640.0) });
        assert_eq!(engine.latest().timestamp, "2025-05-04 09:00:01");
    }

    #[test]
    fn test_live_reading_ignored_in_replay() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.toggle_mode(t);
        assert!(!engine.ingest_live(&live(r#"{"calt":"100"}"#), t));
        engine.record_live_failure(&FetchError::Status(500));
        assert!(engine.error().is_none());
    }

    #[test]
    fn test_load_failures_surface_errors() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(3, 100.0), t);
        engine.log_load_failed(t);
        assert_eq!(engine.error(), Some("Failed to fetch log data."));
        assert!(engine.store().records().is_empty());

        engine.sounding_load_failed();
        assert_eq!(engine.error(), Some("Failed to fetch weather data."));
    }

    #[test]
    fn test_weather_overlay_toggle_drops_sounding() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        assert!(engine.set_weather_overlay(true));
        assert!(!engine.set_weather_overlay(true));
        let sounding = LogStore::parse_sounding("h(mAMSL) T(°C)\n100 10\n").unwrap();
        engine.install_sounding(sounding);
        assert_eq!(engine.snapshot().sounding.len(), 1);
        assert!(engine.set_weather_overlay(false));
        assert!(engine.snapshot().sounding.is_empty());
    }

    #[test]
    fn test_snapshot_flags() {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        engine.install_log(log(25, 100.0), t);
        engine.toggle_mode(t);
        engine.pause(t);
        let snap = engine.snapshot();
        assert!(snap.is_replay);
        assert!(snap.is_paused);
        assert_eq!(snap.log_records, 25);
        assert_eq!(snap.replay_position, Some(0));
        assert_eq!(snap.altitude_max, 1500.0);
    }
}
