// Point parsing for the three external sources
// Each parser turns one raw record into a typed value or drops it.

pub mod number;
pub mod log_record;
pub mod sounding;
pub mod live;

// Re-export main types
pub use log_record::{parse_log, parse_log_line, LogRecord};
pub use sounding::{parse_sounding, FieldValue, SoundingField, WeatherSample};
pub use live::LiveReading;
