//! Database model types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Bodies longer than this many characters are truncated before storage.
pub const MAX_RESPONSE_TEXT_CHARS: usize = 1000;

/// A request log row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub name_parameter: String,
    /// HTTP status, or 0 for a transport failure.
    pub response_status: u16,
    pub response_text: String,
}

/// A stored request log row.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLog {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub name_parameter: String,
    pub response_status: u16,
    pub response_text: String,
}

/// Cut a response body down to `MAX_RESPONSE_TEXT_CHARS` characters, appending
/// `...` when anything was dropped.
pub fn truncate_response_text(body: &str) -> String {
    match body.char_indices().nth(MAX_RESPONSE_TEXT_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
