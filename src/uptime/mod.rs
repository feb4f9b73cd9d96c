//! Uptime aggregation engine.
//!
//! Pure calculators over an ordered snapshot of probe outcomes:
//! request-based uptime, time-window availability and an error breakdown.
//! None of them perform I/O; the caller loads outcomes from the store first.

mod breakdown;
mod report;
mod request;
mod window;

pub use breakdown::*;
pub use report::*;
pub use request::*;
pub use window::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only status code counted as a success.
pub const SUCCESS_STATUS: u16 = 200;

/// Status code recorded when no HTTP response was received at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Uptime calculation error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UptimeError {
    #[error("invalid window size: {0}s (must be positive)")]
    InvalidWindowSize(i64),
}

/// A single recorded probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub timestamp: DateTime<Utc>,
    /// HTTP status, or `TRANSPORT_FAILURE_STATUS` when the request never completed.
    pub status_code: u16,
}

impl Outcome {
    pub fn new(timestamp: DateTime<Utc>, status_code: u16) -> Self {
        Self {
            timestamp,
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == SUCCESS_STATUS
    }
}

/// Percentage of `part` in `whole`, or 0.0 when `whole` is zero.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
