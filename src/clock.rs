// Time sources
//
// Live mode measures wall-clock seconds since the mode was entered. Replay runs a
// virtual clock anchored at the first log record that advances REPLAY_TIME_FACTOR
// times faster than real time, only while running. Time is always passed in, so
// the same code runs under a real or a paused tokio clock.

use tokio::time::{Duration, Instant};

use crate::parse::LogRecord;

/// Wall-clock origin of the current live session
#[derive(Debug, Clone, Copy)]
pub struct LiveClock {
    started: Instant,
}

impl LiveClock {
    pub fn start(now: Instant) -> Self {
        LiveClock { started: now }
    }

    /// Seconds since live mode was entered.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started).as_secs_f64()
    }
}

/// Pausable, accelerated virtual clock
#[derive(Debug, Clone, Copy)]
pub struct ReplayClock {
    /// Virtual time at wall-elapsed zero
    t0: f64,
    factor: f64,
    /// Running time accumulated by finished run segments
    accumulated: Duration,
    /// Start of the current run segment; None while paused
    running_since: Option<Instant>,
}

impl ReplayClock {
    /// Start running at `now`.
    pub fn start(t0: f64, factor: f64, now: Instant) -> Self {
        ReplayClock {
            t0,
            factor,
            accumulated: Duration::ZERO,
            running_since: Some(now),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Freeze the clock. No-op when already paused.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    /// Continue from the frozen virtual time. No-op when running.
    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Real time spent running, excluding paused intervals.
    pub fn running_elapsed(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_duration_since(since),
            None => self.accumulated,
        }
    }

    /// Current virtual time (log runtime seconds).
    pub fn simulated_time(&self, now: Instant) -> f64 {
        self.t0 + self.running_elapsed(now).as_secs_f64() * self.factor
    }
}

/// Monotonic position in the sorted log
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayCursor {
    next: usize,
}

impl ReplayCursor {
    /// Advance past every record with `runtime <= until` and return them in order.
    pub fn drain<'a>(&mut self, records: &'a [LogRecord], until: f64) -> &'a [LogRecord] {
        let start = self.next.min(records.len());
        let mut end = start;
        while end < records.len() && records[end].runtime <= until {
            end += 1;
        }
        self.next = end;
        &records[start..end]
    }

    /// Number of records consumed so far.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn is_exhausted(&self, len: usize) -> bool {
        self.next >= len
    }
}

/// Replay driver state: clock (absent while the log is empty), cursor and pause flag
#[derive(Debug, Clone, Copy)]
pub struct ReplaySource {
    pub clock: Option<ReplayClock>,
    pub cursor: ReplayCursor,
    pub paused: bool,
}

impl ReplaySource {
    /// Fresh playback of `records` starting at `now`.
    pub fn start(records: &[LogRecord], factor: f64, now: Instant, paused: bool) -> Self {
        let clock = records.first().map(|first| {
            let mut clock = ReplayClock::start(first.runtime, factor, now);
            if paused {
                clock.pause(now);
            }
            clock
        });
        ReplaySource {
            clock,
            cursor: ReplayCursor::default(),
            paused,
        }
    }
}

/// The one active time source
#[derive(Debug, Clone, Copy)]
pub enum TimeSource {
    Live(LiveClock),
    Replay(ReplaySource),
}
