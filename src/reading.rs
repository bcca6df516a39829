// Latest-reading snapshot and the per-instant measurement fanned out to the windows

use serde::Serialize;

use crate::parse::{LiveReading, LogRecord};
use crate::series::{Quantity, Sample, SeriesSet};

/// All quantities observed at one instant, whichever source produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Position on the active time axis (s)
    pub time: f64,
    pub altitude: f64,
    pub vertical_speed: f64,
    pub acceleration: f64,
    pub direction: f64,
    pub speed: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: String,
}

impl Measurement {
    /// Replay measurement: time is the record's own runtime, the timestamp its Date + Time.
    pub fn from_record(record: &LogRecord) -> Self {
        Measurement {
            time: record.runtime,
            altitude: record.baro_altitude,
            vertical_speed: record.vertical_speed,
            acceleration: record.mean_acceleration,
            direction: record.heading,
            speed: record.ground_speed,
            temperature: record.envelope_temp,
            humidity: record.humidity_proxy,
            timestamp: record.timestamp(),
        }
    }

    /// Live measurement at `elapsed` seconds after entering live mode.
    pub fn from_live(reading: &LiveReading, elapsed: f64) -> Self {
        Measurement {
            time: elapsed,
            altitude: reading.altitude,
            vertical_speed: reading.vertical_speed,
            acceleration: reading.acceleration,
            direction: reading.direction,
            speed: reading.speed,
            temperature: reading.temperature,
            humidity: reading.humidity,
            timestamp: reading.gps_timestamp.clone(),
        }
    }

    pub fn value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::VerticalSpeed => self.vertical_speed,
            Quantity::Acceleration => self.acceleration,
            Quantity::Direction => self.direction,
            Quantity::Speed => self.speed,
            Quantity::Temperature => self.temperature,
            Quantity::Humidity => self.humidity,
        }
    }

    /// The sample this measurement contributes to `quantity`'s window.
    pub fn sample(&self, quantity: Quantity) -> Sample {
        Sample {
            time: self.time,
            value: self.value(quantity),
            altitude: quantity.tracks_altitude().then_some(self.altitude),
        }
    }

    /// Append to all six windows.
    pub fn fan_out(&self, series: &mut SeriesSet) {
        for q in Quantity::ALL {
            series.append(q, self.sample(q));
        }
    }
}

/// Values shown in the numeric panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestReading {
    pub altitude: f64,
    pub vertical_speed: f64,
    pub acceleration: f64,
    pub direction: f64,
    pub speed: f64,
    pub temperature: f64,
    pub humidity: f64,
    /// GPS time in live mode, log Date + Time in replay; empty until the first reading
    pub timestamp: String,
}

impl From<&Measurement> for LatestReading {
    fn from(m: &Measurement) -> Self {
        LatestReading {
            altitude: m.altitude,
            vertical_speed: m.vertical_speed,
            acceleration: m.acceleration,
            direction: m.direction,
            speed: m.speed,
            temperature: m.temperature,
            humidity: m.humidity,
            timestamp: m.timestamp.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_log_line;

    #[test]
    fn test_from_record_and_fan_out() {
        let record = parse_log_line(r#"{"Runtime":4,"Baro_Alt_m":420,"VAR_Kal_m_s":1.5,"meanACC_Kal_m_s2":0.01,"HDG_deg":90,"GS_kt":7,"Envelope_Temp_Deg":55,"varioVar_m_s":0.2,"Date":"2025-05-04","Time":"08:00:04"}"#).unwrap();
        let m = Measurement::from_record(&record);
        let mut set = SeriesSet::new();
        m.fan_out(&mut set);

        for q in Quantity::ALL {
            assert_eq!(set.get(q).len(), 1);
        }
        let acc = set.get(Quantity::Acceleration).snapshot()[0];
        assert_eq!(acc, Sample { time: 4.0, value: 0.01, altitude: None });
        let dir = set.get(Quantity::Direction).snapshot()[0];
        assert_eq!(dir, Sample { time: 4.0, value: 90.0, altitude: Some(420.0) });
        let hum = set.get(Quantity::Humidity).snapshot()[0];
        assert_eq!(hum.value, 0.2);

        let latest = LatestReading::from(&m);
        assert_eq!(latest.altitude, 420.0);
        assert_eq!(latest.timestamp, "2025-05-04 08:00:04");
    }

    #[test]
    fn test_default_latest_is_zeroed() {
        let latest = LatestReading::default();
        assert_eq!(latest.altitude, 0.0);
        assert_eq!(latest.timestamp, "");
    }
}
