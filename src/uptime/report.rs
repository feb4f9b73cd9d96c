//! Report assembly: the shape of data handed to the formatters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    compute_request_uptime, compute_window_uptime, percentage, summarize_errors, ErrorSummary,
    Outcome, RequestUptime, UptimeError, WindowUptime,
};

/// First and last recorded timestamps plus the number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total: u64,
}

impl TimeRange {
    /// Derive the range from an ordered outcome slice.
    pub fn from_outcomes(outcomes: &[Outcome]) -> Option<Self> {
        let first = outcomes.first()?;
        let last = outcomes.last()?;
        Some(Self {
            start: first.timestamp,
            end: last.timestamp,
            total: outcomes.len() as u64,
        })
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 60_000.0
    }
}

/// Overall service grade derived from the request success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Health {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl Health {
    pub fn from_success_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            Health::Excellent
        } else if rate >= 90.0 {
            Health::Good
        } else if rate >= 80.0 {
            Health::Warning
        } else {
            Health::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Health::Excellent => "Excellent",
            Health::Good => "Good",
            Health::Warning => "Warning",
            Health::Critical => "Critical",
        }
    }

    /// Severity used for styling: "good", "warning" or "bad".
    pub fn severity(&self) -> &'static str {
        match self {
            Health::Excellent | Health::Good => "good",
            Health::Warning => "warning",
            Health::Critical => "bad",
        }
    }
}

/// Everything the text and HTML formatters need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub time_range: TimeRange,
    pub request_uptime: RequestUptime,
    pub window_uptime: WindowUptime,
    pub errors: ErrorSummary,
}

impl Report {
    /// Run all calculators over one outcome snapshot.
    pub fn assemble(
        outcomes: &[Outcome],
        time_range: TimeRange,
        window_size_seconds: i64,
    ) -> Result<Self, UptimeError> {
        let window_uptime = compute_window_uptime(outcomes, window_size_seconds)?;

        Ok(Self {
            time_range,
            request_uptime: compute_request_uptime(outcomes),
            window_uptime,
            errors: summarize_errors(outcomes),
        })
    }

    pub fn failed(&self) -> u64 {
        self.request_uptime.failed()
    }

    pub fn failure_rate(&self) -> f64 {
        percentage(self.failed(), self.request_uptime.total)
    }

    pub fn health(&self) -> Health {
        Health::from_success_rate(self.request_uptime.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uptime::test_util::outcomes;

    #[test]
    fn test_assemble_report() {
        let data = outcomes(&[(0, 200), (1, 500), (65, 200), (70, 0)]);
        let range = TimeRange::from_outcomes(&data).unwrap();
        let report = Report::assemble(&data, range, 60).unwrap();

        assert_eq!(report.time_range.total, 4);
        assert_eq!(report.request_uptime.successful, 2);
        assert_eq!(report.window_uptime.total_windows, 2);
        assert_eq!(report.window_uptime.up_windows, 2);
        assert_eq!(report.errors.get(500), Some(1));
        assert_eq!(report.errors.get(0), Some(1));
        assert_eq!(report.failed(), 2);
        assert_eq!(report.failure_rate(), 50.0);
        assert_eq!(report.health(), Health::Critical);
    }

    #[test]
    fn test_assemble_rejects_bad_window() {
        let data = outcomes(&[(0, 200)]);
        let range = TimeRange::from_outcomes(&data).unwrap();
        assert_eq!(
            Report::assemble(&data, range, 0),
            Err(UptimeError::InvalidWindowSize(0))
        );
    }

    #[test]
    fn test_time_range() {
        assert!(TimeRange::from_outcomes(&[]).is_none());

        let range = TimeRange::from_outcomes(&outcomes(&[(0, 200), (30, 500), (90, 200)])).unwrap();
        assert_eq!(range.total, 3);
        assert_eq!(range.duration_minutes(), 1.5);
    }

    #[test]
    fn test_health_thresholds() {
        assert_eq!(Health::from_success_rate(100.0), Health::Excellent);
        assert_eq!(Health::from_success_rate(95.0), Health::Excellent);
        assert_eq!(Health::from_success_rate(94.99), Health::Good);
        assert_eq!(Health::from_success_rate(90.0), Health::Good);
        assert_eq!(Health::from_success_rate(85.0), Health::Warning);
        assert_eq!(Health::from_success_rate(79.9), Health::Critical);
        assert_eq!(Health::Good.severity(), "good");
        assert_eq!(Health::Critical.label(), "Critical");
    }

    #[test]
    fn test_report_json_shape() {
        let data = outcomes(&[(0, 200), (1, 500)]);
        let range = TimeRange::from_outcomes(&data).unwrap();
        let report = Report::assemble(&data, range, 60).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["time_range"]["total"], 2);
        assert_eq!(json["request_uptime"]["successful"], 1);
        assert_eq!(json["window_uptime"]["up_windows"], 1);
        assert_eq!(json["window_uptime"]["window_size_seconds"], 60);
        assert_eq!(json["errors"][0]["status_code"], 500);
    }
}
