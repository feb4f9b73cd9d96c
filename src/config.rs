//! Configuration module for uptrail.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Command-line flags are applied on top by the caller, then the result is
//! validated once and passed explicitly to each component.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::uptime::DEFAULT_WINDOW_SECONDS;

/// Configuration error types.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Unparseable { var: &'static str, value: String },
    #[error("{0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path to the SQLite database file (default: "request_logs.db")
    pub db_path: String,
    /// Endpoint the monitor posts names to
    pub api_url: String,
    /// Seconds between probes (default: 5)
    pub interval_secs: u64,
    /// How long a monitoring run lasts, in minutes (default: 10)
    pub duration_mins: f64,
    /// Availability window size in seconds (default: 60)
    pub window_secs: i64,
    /// CSV file with a `name` column (default: "data/seed_names.csv")
    pub names_path: String,
    /// Where the HTML dashboard is written (default: "index.html")
    pub output_path: String,
    /// HTTP port for `serve` (default: 8080)
    pub http_port: u16,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "request_logs.db".to_string(),
            api_url: "https://qa-challenge-nine.vercel.app/api/name-checker".to_string(),
            interval_secs: 5,
            duration_mins: 10.0,
            window_secs: DEFAULT_WINDOW_SECONDS,
            names_path: "data/seed_names.csv".to_string(),
            output_path: "index.html".to_string(),
            http_port: 8080,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `UPTRAIL_DB_PATH`: Database file path
    /// - `UPTRAIL_API_URL`: Monitored endpoint
    /// - `UPTRAIL_INTERVAL_SEC`: Seconds between probes
    /// - `UPTRAIL_DURATION_MIN`: Monitoring run length in minutes
    /// - `UPTRAIL_WINDOW_SEC`: Availability window size
    /// - `UPTRAIL_NAMES_PATH`: Names CSV file
    /// - `UPTRAIL_OUTPUT_PATH`: HTML dashboard output path
    /// - `UPTRAIL_HTTP_PORT`: Port for the report server
    /// - `UPTRAIL_REQUEST_TIMEOUT_SEC`: Per-request timeout
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("UPTRAIL_DB_PATH") {
            cfg.db_path = v;
        }
        if let Some(v) = lookup("UPTRAIL_API_URL") {
            cfg.api_url = v;
        }
        if let Some(v) = lookup("UPTRAIL_NAMES_PATH") {
            cfg.names_path = v;
        }
        if let Some(v) = lookup("UPTRAIL_OUTPUT_PATH") {
            cfg.output_path = v;
        }

        parse_var(&lookup, "UPTRAIL_INTERVAL_SEC", &mut cfg.interval_secs)?;
        parse_var(&lookup, "UPTRAIL_DURATION_MIN", &mut cfg.duration_mins)?;
        parse_var(&lookup, "UPTRAIL_WINDOW_SEC", &mut cfg.window_secs)?;
        parse_var(&lookup, "UPTRAIL_HTTP_PORT", &mut cfg.http_port)?;
        parse_var(&lookup, "UPTRAIL_REQUEST_TIMEOUT_SEC", &mut cfg.request_timeout_secs)?;

        Ok(cfg)
    }

    /// Reject values the components cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_secs <= 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be positive, got {}",
                self.window_secs
            )));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid("interval must be at least 1 second".to_string()));
        }
        if !fits_on_clock(self.interval()) {
            return Err(ConfigError::Invalid(format!(
                "interval of {} seconds is too large",
                self.interval_secs
            )));
        }
        if !(self.duration_mins > 0.0 && self.duration_mins.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "duration must be a positive number of minutes, got {}",
                self.duration_mins
            )));
        }
        match Duration::try_from_secs_f64(self.duration_mins * 60.0) {
            Ok(duration) if fits_on_clock(duration) => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "duration of {} minutes is too large",
                    self.duration_mins
                )))
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Run length; values too large to represent saturate at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_mins * 60.0).unwrap_or(Duration::MAX)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Whether a deadline `span` from now can be represented.
fn fits_on_clock(span: Duration) -> bool {
    std::time::Instant::now().checked_add(span).is_some()
}

fn parse_var<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Unparseable { var, value })?;
    }
    Ok(())
}
