// Loaded datasets
//
// The historical log and the weather sounding are rebuilt wholesale on every
// successful fetch and swapped in as a whole; nothing mutates them in place.

use std::sync::Arc;

use crate::error::ParseError;
use crate::parse::{parse_log, parse_sounding, LogRecord, WeatherSample};

/// Immutable historical log + sounding
#[derive(Debug, Clone)]
pub struct LogStore {
    records: Arc<[LogRecord]>,
    sounding: Arc<[WeatherSample]>,
}

impl LogStore {
    pub fn new(records: Vec<LogRecord>, sounding: Vec<WeatherSample>) -> Self {
        LogStore {
            records: sort_records(records).into(),
            sounding: sounding.into(),
        }
    }

    /// Parse log text into a sorted record list.
    pub fn parse_log(text: &str) -> Vec<LogRecord> {
        sort_records(parse_log(text))
    }

    /// Parse sounding text.
    pub fn parse_sounding(text: &str) -> Result<Vec<WeatherSample>, ParseError> {
        parse_sounding(text)
    }

    /// Same sounding, new log.
    pub fn with_records(&self, records: Vec<LogRecord>) -> Self {
        LogStore {
            records: sort_records(records).into(),
            sounding: Arc::clone(&self.sounding),
        }
    }

    /// Same log, new sounding.
    pub fn with_sounding(&self, sounding: Vec<WeatherSample>) -> Self {
        LogStore {
            records: Arc::clone(&self.records),
            sounding: sounding.into(),
        }
    }

    /// Records sorted ascending by runtime
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn sounding(&self) -> &[WeatherSample] {
        &self.sounding
    }
}

impl Default for LogStore {
    fn default() -> Self {
        LogStore::new(Vec::new(), Vec::new())
    }
}

/// Stable sort by runtime; equal runtimes keep file order.
fn sort_records(mut records: Vec<LogRecord>) -> Vec<LogRecord> {
    records.sort_by(|a, b| a.runtime.total_cmp(&b.runtime));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(runtime: &str, alt: &str, date: &str) -> String {
        format!(r#"{{"Runtime":"{runtime}","Baro_Alt_m":"{alt}","Date":"{date}"}}"#)
    }

    #[test]
    fn test_log_sorted_and_filtered() {
        let text = [
            line("5", "100", "a"),
            line("1", "100", "b"),
            line("bad", "100", "c"),
            line("3", "x", "d"),
            line("2", "100", "e"),
        ]
        .join("\n");
        let store = LogStore::default().with_records(LogStore::parse_log(&text));
        let runtimes: Vec<f64> = store.records().iter().map(|r| r.runtime).collect();
        assert_eq!(runtimes, vec![1.0, 2.0, 5.0]);
        assert!(store
            .records()
            .iter()
            .all(|r| !r.runtime.is_nan() && !r.baro_altitude.is_nan()));
    }

    #[test]
    fn test_sort_is_stable() {
        let text = [line("2", "1", "first"), line("1", "1", "x"), line("2", "1", "second")].join("\n");
        let records = LogStore::parse_log(&text);
        assert_eq!(records[1].date, "first");
        assert_eq!(records[2].date, "second");
    }

    #[test]
    fn test_replacement_keeps_other_dataset() {
        let sounding = LogStore::parse_sounding("h(mAMSL) T(°C)\n100 10\n").unwrap();
        let store = LogStore::new(Vec::new(), sounding);
        let store = store.with_records(LogStore::parse_log(&line("1", "10", "d")));
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.sounding().len(), 1);

        let store = store.with_sounding(Vec::new());
        assert_eq!(store.records().len(), 1);
        assert!(store.sounding().is_empty());
    }
}
