//! Probe module for the monitored HTTP endpoint.

mod http;

pub use http::*;

use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// What one probe attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    /// Record a transport-level failure as status 0.
    pub fn transport_failure(error: &ProbeError) -> Self {
        Self {
            status: crate::uptime::TRANSPORT_FAILURE_STATUS,
            body: format!("Request failed: {}", error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == crate::uptime::SUCCESS_STATUS
    }

    /// First `max_chars` characters of the body, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        self.body.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_response() {
        let resp = ProbeResponse::transport_failure(&ProbeError::Network("connection refused".into()));
        assert_eq!(resp.status, 0);
        assert_eq!(resp.body, "Request failed: network error: connection refused");
        assert!(!resp.is_success());
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let resp = ProbeResponse {
            status: 200,
            body: "ñandú".repeat(20),
        };
        assert_eq!(resp.preview(3), "ñan");
        assert_eq!(resp.preview(1000).chars().count(), 100);
    }
}
