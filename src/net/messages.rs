// JSON message type definitions
// Live telemetry payload and the snapshot endpoint's query parameters.

use serde::Deserialize;
use serde_json::Value;

/// Payload of the live `/readings` endpoint.
///
/// The logger sends everything as strings, but numbers are tolerated too, so each
/// field is kept as a raw JSON value and converted by the parser.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMessage {
    /// Altitude (m)
    #[serde(default)]
    pub calt: Value,
    /// Vertical speed (m/s)
    #[serde(default)]
    pub cvario: Value,
    /// Acceleration (m/s²)
    #[serde(default)]
    pub cacc: Value,
    #[serde(default)]
    pub gps_angle: Value,
    #[serde(default)]
    pub gps_speed: Value,
    /// Envelope temperature (°C)
    #[serde(default)]
    pub tbt: Value,
    /// Humidity (%)
    #[serde(default)]
    pub lbc: Value,
    #[serde(default)]
    pub gps_year: Value,
    #[serde(default)]
    pub gps_mon: Value,
    #[serde(default)]
    pub gps_day: Value,
    #[serde(default)]
    pub gps_std: Value,
    #[serde(default)]
    pub gps_min: Value,
    #[serde(default)]
    pub gps_sek: Value,
}

fn default_width() -> f64 {
    300.0
}

fn default_height() -> f64 {
    400.0
}

/// Query string of `GET /plots`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewportQuery {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

impl Default for ViewportQuery {
    fn default() -> Self {
        ViewportQuery {
            width: default_width(),
            height: default_height(),
        }
    }
}
