// Error types
// Source-level failures only; record-level problems are filtered, never raised.

use thiserror::Error;

/// A text payload could not be turned into a dataset at all.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("sounding has no header row")]
    MissingHeader,
}

/// A fetch from one of the external sources failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
