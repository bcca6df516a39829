// HTTP data sources
// Fetches the historical log, the weather sounding and live readings.

use std::future::Future;

use reqwest::{Client, Response};
use tracing::debug;

use crate::config::Config;
use crate::constants::{FETCH_TIMEOUT, LIVE_FETCH_TIMEOUT};
use crate::error::FetchError;
use crate::parse::{LiveReading, LogRecord, WeatherSample};
use crate::store::LogStore;
use super::messages::LiveMessage;

/// Where the session gets its data from.
///
/// Each fetch either yields a parsed dataset or a source-level error; records that
/// fail to parse are dropped inside the fetch.
pub trait DataSource: Send + Sync + 'static {
    /// Historical log, sorted by runtime.
    fn fetch_log(&self) -> impl Future<Output = Result<Vec<LogRecord>, FetchError>> + Send;

    /// Weather sounding levels.
    fn fetch_sounding(&self) -> impl Future<Output = Result<Vec<WeatherSample>, FetchError>> + Send;

    /// One live reading (not yet gated).
    fn fetch_live(&self) -> impl Future<Output = Result<LiveReading, FetchError>> + Send;
}

/// Endpoints of the three sources
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub log_url: String,
    pub weather_url: String,
    pub live_url: String,
}

impl From<&Config> for Endpoints {
    fn from(config: &Config) -> Self {
        Endpoints {
            log_url: config.log_url.clone(),
            weather_url: config.weather_url.clone(),
            live_url: config.live_url.clone(),
        }
    }
}

/// reqwest-backed source
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoints: Endpoints,
}

impl HttpSource {
    pub fn new(endpoints: Endpoints) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(HttpSource { client, endpoints })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = check_status(self.client.get(url).send().await?)?;
        Ok(response.text().await?)
    }
}

/// Non-2xx responses count as failures.
fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

impl DataSource for HttpSource {
    async fn fetch_log(&self) -> Result<Vec<LogRecord>, FetchError> {
        let text = self.get_text(&self.endpoints.log_url).await?;
        let records = LogStore::parse_log(&text);
        debug!("Fetched log from {} ({} bytes, {} records)", self.endpoints.log_url, text.len(), records.len());
        Ok(records)
    }

    async fn fetch_sounding(&self) -> Result<Vec<WeatherSample>, FetchError> {
        let text = self.get_text(&self.endpoints.weather_url).await?;
        let sounding = LogStore::parse_sounding(&text)?;
        debug!("Fetched sounding from {} ({} levels)", self.endpoints.weather_url, sounding.len());
        Ok(sounding)
    }

    async fn fetch_live(&self) -> Result<LiveReading, FetchError> {
        let response = self
            .client
            .get(&self.endpoints.live_url)
            .timeout(LIVE_FETCH_TIMEOUT)
            .send()
            .await?;
        let body = check_status(response)?.bytes().await?;
        let msg: LiveMessage = serde_json::from_slice(&body)?;
        Ok(LiveReading::from_message(&msg))
    }
}
