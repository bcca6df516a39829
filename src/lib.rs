pub mod constants;
pub mod config;
pub mod error;
pub mod parse;
pub mod store;
pub mod series;
pub mod reading;
pub mod clock;
pub mod engine;
pub mod session;
pub mod net;
pub mod projection;
pub mod dashboard;
