//! HTML dashboard rendered with askama.

use std::collections::BTreeMap;

use askama::Template;
use chrono::{DateTime, Utc};

use super::status_label;
use crate::uptime::{window_start_time, Report, WindowStats};

struct ErrorRow {
    label: String,
    count: u64,
    percentage: String,
}

struct WindowRow {
    label: String,
    severity: &'static str,
    total: u64,
    successful: u64,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    endpoint: &'a str,
    generated_at: String,
    health_label: &'static str,
    severity: &'static str,
    success_rate: String,
    failure_rate: String,
    window_rate: String,
    window_severity: &'static str,
    duration_minutes: String,
    total: u64,
    successful: u64,
    failed: u64,
    start_time: String,
    end_time: String,
    date: String,
    window_size_seconds: i64,
    up_windows: u64,
    total_windows: u64,
    errors: Vec<ErrorRow>,
    windows: Vec<WindowRow>,
}

/// Inputs for the dashboard page.
pub struct Dashboard<'a> {
    pub report: &'a Report,
    /// Per-window stats for the timeline strip.
    pub windows: &'a BTreeMap<i64, WindowStats>,
    pub endpoint: &'a str,
    pub generated_at: DateTime<Utc>,
}

impl Dashboard<'_> {
    pub fn render(&self) -> Result<String, askama::Error> {
        self.template().render()
    }

    fn template(&self) -> DashboardTemplate<'_> {
        let report = self.report;
        let requests = &report.request_uptime;
        let windows = &report.window_uptime;
        let health = report.health();

        let errors = report
            .errors
            .iter()
            .map(|e| ErrorRow {
                label: status_label(e.status_code),
                count: e.count,
                percentage: format!("{:.2}", e.percentage_of(requests.total)),
            })
            .collect();

        let timeline = self
            .windows
            .iter()
            .map(|(&start, stats)| WindowRow {
                label: window_start_time(start)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| start.to_string()),
                severity: if stats.is_up() { "good" } else { "bad" },
                total: stats.total,
                successful: stats.successful,
            })
            .collect();

        DashboardTemplate {
            endpoint: self.endpoint,
            generated_at: self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            health_label: health.label(),
            severity: health.severity(),
            success_rate: format!("{:.2}", requests.percentage),
            failure_rate: format!("{:.2}", report.failure_rate()),
            window_rate: format!("{:.2}", windows.percentage),
            window_severity: crate::uptime::Health::from_success_rate(windows.percentage).severity(),
            duration_minutes: format!("{:.1}", report.time_range.duration_minutes()),
            total: requests.total,
            successful: requests.successful,
            failed: report.failed(),
            start_time: report.time_range.start.format("%H:%M:%S").to_string(),
            end_time: report.time_range.end.format("%H:%M:%S").to_string(),
            date: report.time_range.start.format("%Y-%m-%d").to_string(),
            window_size_seconds: windows.window_size_seconds,
            up_windows: windows.up_windows,
            total_windows: windows.total_windows,
            errors,
            windows: timeline,
        }
    }
}
