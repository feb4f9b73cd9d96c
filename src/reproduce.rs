//! Replays a list of names against the endpoint to tell its deterministic
//! server error apart from the intermittent outage.
//!
//! The endpoint answers 500 for two different reasons. "System is down" is
//! the random outage the monitor measures and is retried here. "Unexpected
//! server error" is returned every time for certain inputs, which is what a
//! reproduction run looks for.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::probe::{HttpProbe, ProbeResponse};
use crate::uptime::{SUCCESS_STATUS, TRANSPORT_FAILURE_STATUS};

/// Body text of the deterministic failure.
pub const BUG_MARKER: &str = "Unexpected server error";
/// Body text of the intermittent outage.
pub const OUTAGE_MARKER: &str = "System is down";

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_PACE: Duration = Duration::from_millis(100);

/// URL-like names with "example" in the host, which trigger the bug.
pub const EXAMPLE_DOMAIN_NAMES: &[&str] = &[
    "https://example.com",
    "http://example.com",
    "http://example.org",
    "http://example.net",
    "http://test.example",
    "http://example.test",
    "http://example.co",
    "http://example.io",
    "http://examples.com",
    "http://myexample.com",
    "http://example123.com",
    "http://www.example.com",
    "http://api.example.com",
    "ftp://example.com",
    "http://example%2Ecom",
    "http%3A//example.com",
    "http://placeholder.com",
    "http://Example.Com",
];

/// Names that are expected to go through.
pub const CONTROL_NAMES: &[&str] = &[
    "http://s.com",
    "http://test.com",
    "http://google.com",
    "http://EXAMPLE.COM",
    "file://example.com",
    "Ana",
];

/// How a name was answered once retries are exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Reproduced,
    Intermittent { attempts: u32 },
    Success,
    Other { status: u16 },
    NoResponse { reason: String },
}

impl Verdict {
    pub fn is_reproduced(&self) -> bool {
        matches!(self, Verdict::Reproduced)
    }

    fn icon(&self) -> &'static str {
        match self {
            Verdict::Reproduced => "🚨",
            Verdict::Intermittent { .. } => "⚠️ ",
            Verdict::Success => "✅",
            Verdict::Other { .. } => "❓",
            Verdict::NoResponse { .. } => "❌",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Reproduced => write!(f, "BUG REPRODUCED"),
            Verdict::Intermittent { attempts } => {
                write!(f, "Intermittent error (after {} attempts)", attempts)
            }
            Verdict::Success => write!(f, "Success"),
            Verdict::Other { status } => write!(f, "Other ({})", status),
            Verdict::NoResponse { reason } => write!(f, "Error: {}", reason),
        }
    }
}

/// One name and what it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub name: String,
    pub verdict: Verdict,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:<30} → {}", self.verdict.icon(), self.name, self.verdict)
    }
}

/// Results of checking a list of names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reproduction {
    pub findings: Vec<Finding>,
}

impl Reproduction {
    pub fn total(&self) -> usize {
        self.findings.len()
    }

    pub fn reproduced(&self) -> usize {
        self.findings.iter().filter(|f| f.verdict.is_reproduced()).count()
    }

    pub fn rate(&self) -> f64 {
        crate::uptime::percentage(self.reproduced() as u64, self.total() as u64)
    }
}

/// Sends names one at a time and classifies each answer.
pub struct Reproducer {
    probe: HttpProbe,
    attempts: u32,
    retry_delay: Duration,
    pace: Duration,
}

impl Reproducer {
    pub fn new(probe: HttpProbe) -> Self {
        Self {
            probe,
            attempts: DEFAULT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            pace: DEFAULT_PACE,
        }
    }

    /// Attempts per name while the outage marker keeps coming back; at least 1.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Pause between consecutive names.
    pub fn pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Check one name, retrying only the intermittent outage.
    pub async fn check(&self, name: &str) -> Verdict {
        for attempt in 1..=self.attempts {
            let response = self.probe.check(name).await;
            match classify(&response) {
                Some(verdict) => return verdict,
                None if attempt < self.attempts => {
                    tracing::debug!("{:?} hit the outage on attempt {}, retrying", name, attempt);
                    tokio::time::sleep(self.retry_delay).await;
                }
                None => {}
            }
        }
        Verdict::Intermittent {
            attempts: self.attempts,
        }
    }

    /// Check every name in order.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Reproduction {
        let mut findings = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pace).await;
            }
            let name = name.as_ref();
            let verdict = self.check(name).await;
            tracing::info!("{:?}: {}", name, verdict);
            findings.push(Finding {
                name: name.to_string(),
                verdict,
            });
        }
        Reproduction { findings }
    }
}

/// Final verdict for a response, or `None` when it is the retryable outage.
fn classify(response: &ProbeResponse) -> Option<Verdict> {
    match response.status {
        500 if response.body.contains(BUG_MARKER) => Some(Verdict::Reproduced),
        500 if response.body.contains(OUTAGE_MARKER) => None,
        SUCCESS_STATUS => Some(Verdict::Success),
        TRANSPORT_FAILURE_STATUS => Some(Verdict::NoResponse {
            reason: response.body.clone(),
        }),
        status => Some(Verdict::Other { status }),
    }
}
