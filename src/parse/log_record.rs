// Historical flight log records
// One JSON object per line; numeric fields may be numbers or numeric strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::number::{normalize_bearing, value_or_zero, value_to_f64, value_to_text};

/// Raw line as written by the logger. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct RawLogRecord {
    #[serde(rename = "Runtime", default)]
    runtime: Value,
    #[serde(rename = "Baro_Alt_m", default)]
    baro_alt: Value,
    #[serde(rename = "VAR_Kal_m_s", default)]
    vario: Value,
    #[serde(rename = "meanACC_Kal_m_s2", default)]
    mean_acc: Value,
    #[serde(rename = "HDG_deg", default)]
    heading: Value,
    #[serde(rename = "GS_kt", default)]
    ground_speed: Value,
    #[serde(rename = "Envelope_Temp_Deg", default)]
    envelope_temp: Value,
    #[serde(rename = "varioVar_m_s", default)]
    vario_var: Value,
    #[serde(rename = "Date", default)]
    date: Value,
    #[serde(rename = "Time", default)]
    time: Value,
}

/// One parsed historical log record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Logger runtime (s); the replay clock runs on this axis
    pub runtime: f64,
    /// Barometric altitude (m)
    pub baro_altitude: f64,
    /// Kalman-filtered vertical speed (m/s)
    pub vertical_speed: f64,
    /// Kalman-filtered mean acceleration (m/s²)
    pub mean_acceleration: f64,
    /// Heading (degrees, [0, 360))
    pub heading: f64,
    /// Ground speed (kt)
    pub ground_speed: f64,
    /// Envelope temperature (°C)
    pub envelope_temp: f64,
    /// Vario variance, displayed in the humidity slot
    pub humidity_proxy: f64,
    pub date: String,
    pub time: String,
}

impl LogRecord {
    /// Display timestamp for the latest-reading panel.
    pub fn timestamp(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Parse one log line. Returns None when the line is not a JSON object or
/// when `Runtime` / `Baro_Alt_m` are not numeric; other fields fall back to 0.
pub fn parse_log_line(line: &str) -> Option<LogRecord> {
    let value: Value = serde_json::from_str(line).ok()?;
    if !value.is_object() {
        return None;
    }
    let raw: RawLogRecord = serde_json::from_value(value).ok()?;

    let runtime = value_to_f64(&raw.runtime);
    let baro_altitude = value_to_f64(&raw.baro_alt);
    if runtime.is_nan() || baro_altitude.is_nan() {
        return None;
    }

    Some(LogRecord {
        runtime,
        baro_altitude,
        vertical_speed: value_or_zero(&raw.vario),
        mean_acceleration: value_or_zero(&raw.mean_acc),
        heading: normalize_bearing(value_or_zero(&raw.heading)),
        ground_speed: value_or_zero(&raw.ground_speed),
        envelope_temp: value_or_zero(&raw.envelope_temp),
        humidity_proxy: value_or_zero(&raw.vario_var),
        date: value_to_text(&raw.date),
        time: value_to_text(&raw.time),
    })
}

/// Parse a whole newline-delimited log. Output keeps file order; sorting is the store's job.
pub fn parse_log(text: &str) -> Vec<LogRecord> {
    let mut dropped = 0usize;
    let records: Vec<LogRecord> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = parse_log_line(line);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();
    if dropped > 0 {
        debug!("log: dropped {} malformed records", dropped);
    }
    records
}
