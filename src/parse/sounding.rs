// Upper-air weather sounding
//
// Whitespace-separated columns, first non-blank line is the header. Known headers map
// onto typed fields; anything else is carried through under its literal header text.
// Wind direction is stored as balloon heading (wind-from + 180°).

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::altitude_in_band;
use crate::error::ParseError;
use super::number::{normalize_bearing, parse_float};

/// A sounding cell. Cells that do not parse as numbers keep their raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric value, or None for a raw-text cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

/// Typed sounding columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundingField {
    Altitude,
    Temperature,
    Speed,
    Humidity,
    Direction,
    Pressure,
    DewPoint,
}

impl SoundingField {
    /// Key a header token maps to: the dictionary name for known headers, the token itself otherwise.
    pub fn key_for_header(header: &str) -> &str {
        match header {
            "h(mAMSL)" => "altitude",
            "T(°C)" => "temperature",
            "Spd(kt)" => "speed",
            "RH(%)" => "humidity",
            "Dir(°)" => "direction",
            "p(hPa)" => "pressure",
            "Dew(°C)" => "dewPoint",
            other => other,
        }
    }

    /// Typed field for a key, if the key names one.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "altitude" => Some(SoundingField::Altitude),
            "temperature" => Some(SoundingField::Temperature),
            "speed" => Some(SoundingField::Speed),
            "humidity" => Some(SoundingField::Humidity),
            "direction" => Some(SoundingField::Direction),
            "pressure" => Some(SoundingField::Pressure),
            "dewPoint" => Some(SoundingField::DewPoint),
            _ => None,
        }
    }
}

/// One retained sounding level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    /// Altitude (m AMSL), always inside the altitude band
    pub altitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<FieldValue>,
    /// Balloon heading (degrees, [0, 360)) derived from the wind-from bearing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<FieldValue>,
    /// Columns with unknown headers, keyed by header text
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl WeatherSample {
    /// Numeric value of a typed column, None when absent or raw text.
    pub fn numeric(&self, field: SoundingField) -> Option<f64> {
        let cell = match field {
            SoundingField::Altitude => return Some(self.altitude),
            SoundingField::Temperature => &self.temperature,
            SoundingField::Speed => &self.speed,
            SoundingField::Humidity => &self.humidity,
            SoundingField::Direction => &self.direction,
            SoundingField::Pressure => &self.pressure,
            SoundingField::DewPoint => &self.dew_point,
        };
        cell.as_ref().and_then(FieldValue::as_f64)
    }
}

/// Parse one data row against the header keys.
///
/// Returns None when the column count differs from the header count, when the
/// altitude is missing or non-numeric, or when it lies outside the altitude band.
/// A non-numeric cell in any other column is kept as raw text.
pub fn parse_sounding_row(keys: &[&str], line: &str) -> Option<WeatherSample> {
    let cells: Vec<&str> = line.split_whitespace().collect();
    if cells.len() != keys.len() {
        warn!("sounding: column count mismatch ({} != {}): {}", cells.len(), keys.len(), line);
        return None;
    }

    let mut altitude: Option<FieldValue> = None;
    let mut sample = WeatherSample {
        altitude: 0.0,
        temperature: None,
        speed: None,
        humidity: None,
        direction: None,
        pressure: None,
        dew_point: None,
        extra: BTreeMap::new(),
    };

    for (&key, &cell) in keys.iter().zip(cells.iter()) {
        let field = SoundingField::from_key(key);
        let mut value = parse_float(cell);
        if field == Some(SoundingField::Direction) {
            value = normalize_bearing(value + 180.0);
        }
        let stored = if value.is_nan() {
            FieldValue::Text(cell.to_string())
        } else {
            FieldValue::Number(value)
        };
        match field {
            Some(SoundingField::Altitude) => altitude = Some(stored),
            Some(SoundingField::Temperature) => sample.temperature = Some(stored),
            Some(SoundingField::Speed) => sample.speed = Some(stored),
            Some(SoundingField::Humidity) => sample.humidity = Some(stored),
            Some(SoundingField::Direction) => sample.direction = Some(stored),
            Some(SoundingField::Pressure) => sample.pressure = Some(stored),
            Some(SoundingField::DewPoint) => sample.dew_point = Some(stored),
            None => {
                sample.extra.insert(key.to_string(), stored);
            }
        }
    }

    match altitude.as_ref().and_then(FieldValue::as_f64) {
        Some(alt) if altitude_in_band(alt) => {
            sample.altitude = alt;
            Some(sample)
        }
        _ => None,
    }
}

/// Parse a whole sounding. Fails only when there is no header row.
pub fn parse_sounding(text: &str) -> Result<Vec<WeatherSample>, ParseError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(ParseError::MissingHeader)?;
    let keys: Vec<&str> = header
        .split_whitespace()
        .map(SoundingField::key_for_header)
        .collect();

    let mut total = 0usize;
    let samples: Vec<WeatherSample> = lines
        .filter_map(|line| {
            total += 1;
            parse_sounding_row(&keys, line)
        })
        .collect();
    debug!("sounding: kept {} of {} rows", samples.len(), total);
    Ok(samples)
}
