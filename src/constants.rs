// Shared constants for the flight display (fixed at build time)

use std::time::Duration;

/// Lower edge of the altitude validity band (m).
pub const ALT_MIN: f64 = 0.0;

/// Upper edge of the altitude validity band (m).
pub const ALT_MAX: f64 = 1500.0;

/// Live telemetry poll cadence.
pub const LIVE_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Replay drain cadence.
pub const REPLAY_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Virtual seconds elapsed per real second of replay.
pub const REPLAY_TIME_FACTOR: f64 = 10.0;

/// Upper bound on a single live poll; a slower request counts as a failed poll.
pub const LIVE_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on any request to a source (log and sounding loads).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the acceleration window.
pub const MAX_POINTS_ACC: usize = 60;

/// Capacity of every other window.
pub const MAX_POINTS_ALT: usize = 10000;

/// Decimation stride for primary series on altitude-valued plots.
pub const OMIT_POINTS: usize = 10;

/// Default symmetric y-range for acceleration plots (m/s²).
pub const MAX_ACC: f64 = 0.05;

// --- Plot geometry (px) ---

/// Top/right/bottom padding of a scatter plot.
pub const PLOT_PADDING: f64 = 20.0;

/// Left padding of a scatter plot (room for y labels).
pub const PLOT_LEFT_PADDING: f64 = 30.0;

/// Vertical anchor of the rotated y-axis title.
pub const Y_AXIS_TITLE_POSITION: f64 = 180.0;

/// y tick labels closer than this to the axis title are suppressed.
pub const LABEL_OVERLAP_THRESHOLD: f64 = 10.0;

/// Gap between the polar plot's outer ring and the plot edge.
pub const POLAR_MARGIN: f64 = 20.0;

// --- Default endpoints ---

pub const DEFAULT_LOG_URL: &str = "https://raw.githubusercontent.com/hlballon/hltemp/refs/heads/main/temp.jsonl";
pub const DEFAULT_WEATHER_URL: &str = "https://raw.githubusercontent.com/hlballon/hltemp/refs/heads/main/temp_w.txt";
pub const DEFAULT_LIVE_URL: &str = "http://192.168.4.1/readings";

/// True when `altitude` lies inside the validity band (the altitude gate).
#[inline]
pub fn altitude_in_band(altitude: f64) -> bool {
    (ALT_MIN..=ALT_MAX).contains(&altitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_altitude_gate_edges() {
        assert!(altitude_in_band(ALT_MIN));
        assert!(altitude_in_band(ALT_MAX));
        assert!(altitude_in_band(750.0));
        assert!(!altitude_in_band(-0.1));
        assert!(!altitude_in_band(2000.0));
        assert!(!altitude_in_band(f64::NAN));
    }
}
