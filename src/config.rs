use clap::Parser;

use crate::constants::{DEFAULT_LIVE_URL, DEFAULT_LOG_URL, DEFAULT_WEATHER_URL};

/// Flight display configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// URL of the historical flight log (one JSON record per line).
    #[arg(long, value_name = "URL", default_value = DEFAULT_LOG_URL)]
    pub log_url: String,

    /// URL of the upper-air weather sounding (whitespace-separated columns).
    #[arg(long, value_name = "URL", default_value = DEFAULT_WEATHER_URL)]
    pub weather_url: String,

    /// URL of the live telemetry endpoint.
    #[arg(long, value_name = "URL", default_value = DEFAULT_LIVE_URL)]
    pub live_url: String,

    /// Start in replay mode once the log is loaded.
    #[arg(long, default_value_t = false)]
    pub replay: bool,

    /// Enable the weather overlay at startup.
    #[arg(long, default_value_t = false)]
    pub weather: bool,

    /// Serve /snapshot and /plots on this [host:]port.
    #[arg(long, value_name = "ADDR")]
    pub http_listen: Option<String>,

    /// Status logging interval in seconds, <= 0 to disable
    #[arg(long, default_value_t = 15, allow_negative_numbers = true)]
    pub status_interval: i32,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Status log period, None when disabled.
    pub fn status_period(&self) -> Option<std::time::Duration> {
        (self.status_interval > 0).then(|| std::time::Duration::from_secs(self.status_interval as u64))
    }

    /// Parse `--http-listen`: a bare port binds every interface.
    pub fn http_addr(&self) -> Option<Result<std::net::SocketAddr, std::net::AddrParseError>> {
        self.http_listen.as_deref().map(|addr| {
            if addr.chars().all(|c| c.is_ascii_digit()) {
                format!("0.0.0.0:{}", addr).parse()
            } else {
                addr.parse()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["flight-display"]);
        assert_eq!(config.live_url, DEFAULT_LIVE_URL);
        assert!(!config.replay);
        assert!(!config.weather);
        assert_eq!(config.status_period(), Some(std::time::Duration::from_secs(15)));
        assert!(config.http_addr().is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::parse_from([
            "flight-display",
            "--replay",
            "--weather",
            "--status-interval",
            "-1",
            "--http-listen",
            "8080",
            "-v",
        ]);
        assert!(config.replay && config.weather && config.verbose);
        assert_eq!(config.status_period(), None);
        assert_eq!(config.http_addr().unwrap().unwrap().port(), 8080);
    }

    #[test]
    fn test_http_addr_with_host() {
        let config = Config::parse_from(["flight-display", "--http-listen", "127.0.0.1:9000"]);
        let addr = config.http_addr().unwrap().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9000");
    }
}
