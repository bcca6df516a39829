// Network layer module
// HTTP sources for the log, sounding and live readings, plus the snapshot endpoint

pub mod messages;
pub mod client;
pub mod server;

pub use messages::{LiveMessage, ViewportQuery};
pub use client::{DataSource, Endpoints, HttpSource};
pub use server::SnapshotServer;
