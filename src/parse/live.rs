// Live telemetry readings
// Converts a polled /readings message into a typed reading and applies the admission gate.

use serde::Serialize;
use serde_json::Value;

use crate::constants::altitude_in_band;
use crate::net::messages::LiveMessage;
use super::number::{value_or_zero, value_to_text};

/// One polled live snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReading {
    /// Altitude (m)
    pub altitude: f64,
    /// Vertical speed (m/s)
    pub vertical_speed: f64,
    /// Acceleration (m/s²)
    pub acceleration: f64,
    /// GPS track angle (degrees)
    pub direction: f64,
    /// GPS ground speed (kt)
    pub speed: f64,
    /// Envelope temperature (°C)
    pub temperature: f64,
    /// Humidity (%)
    pub humidity: f64,
    /// "YYYY-MM-DD HH:MM:SS" assembled from the GPS subfields
    pub gps_timestamp: String,
}

impl LiveReading {
    /// Build a reading; every numeric field falls back to 0 independently.
    pub fn from_message(msg: &LiveMessage) -> Self {
        LiveReading {
            altitude: value_or_zero(&msg.calt),
            vertical_speed: value_or_zero(&msg.cvario),
            acceleration: value_or_zero(&msg.cacc),
            direction: value_or_zero(&msg.gps_angle),
            speed: value_or_zero(&msg.gps_speed),
            temperature: value_or_zero(&msg.tbt),
            humidity: value_or_zero(&msg.lbc),
            gps_timestamp: gps_timestamp(msg),
        }
    }

    /// True when no field is NaN.
    pub fn is_well_formed(&self) -> bool {
        [
            self.altitude,
            self.vertical_speed,
            self.acceleration,
            self.direction,
            self.speed,
            self.temperature,
            self.humidity,
        ]
        .iter()
        .all(|v| !v.is_nan())
    }

    /// Admission gate: well formed and altitude inside the band.
    pub fn is_admissible(&self) -> bool {
        self.is_well_formed() && altitude_in_band(self.altitude)
    }
}

/// Left-pad to two characters with '0'.
fn pad2(value: &Value) -> String {
    format!("{:0>2}", value_to_text(value))
}

/// Assemble the GPS date/time. Year is a two-digit offset from 2000.
pub fn gps_timestamp(msg: &LiveMessage) -> String {
    format!(
        "20{}-{}-{} {}:{}:{}",
        pad2(&msg.gps_year),
        pad2(&msg.gps_mon),
        pad2(&msg.gps_day),
        pad2(&msg.gps_std),
        pad2(&msg.gps_min),
        pad2(&msg.gps_sek),
    )
}
