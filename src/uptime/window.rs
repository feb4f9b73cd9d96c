//! Time-window availability.
//!
//! Outcomes are bucketed into fixed-size windows aligned to the Unix epoch.
//! A window exists only when at least one outcome falls inside it, so gaps in
//! monitoring never count as downtime. A window is up when it holds at least
//! one successful outcome, no matter how many failures sit next to it.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use super::{percentage, Outcome, UptimeError};

/// Window size used when none is configured.
pub const DEFAULT_WINDOW_SECONDS: i64 = 60;

/// Per-window request counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowStats {
    pub total: u64,
    pub successful: u64,
}

impl WindowStats {
    pub fn is_up(&self) -> bool {
        self.successful > 0
    }
}

/// Fraction of populated windows that were up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WindowUptime {
    pub percentage: f64,
    pub up_windows: u64,
    pub total_windows: u64,
    pub window_size_seconds: i64,
}

/// Start of the window containing `timestamp`, in epoch seconds.
pub fn window_start(timestamp: DateTime<Utc>, window_size_seconds: i64) -> i64 {
    timestamp.timestamp().div_euclid(window_size_seconds) * window_size_seconds
}

/// Convert a window start back into an instant.
pub fn window_start_time(start: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(start, 0).single()
}

fn check_window_size(window_size_seconds: i64) -> Result<(), UptimeError> {
    if window_size_seconds <= 0 {
        return Err(UptimeError::InvalidWindowSize(window_size_seconds));
    }
    Ok(())
}

/// Group outcomes by window start, ordered by time.
pub fn bucket_windows(
    outcomes: &[Outcome],
    window_size_seconds: i64,
) -> Result<BTreeMap<i64, WindowStats>, UptimeError> {
    check_window_size(window_size_seconds)?;

    let mut windows: BTreeMap<i64, WindowStats> = BTreeMap::new();
    for outcome in outcomes {
        let stats = windows
            .entry(window_start(outcome.timestamp, window_size_seconds))
            .or_default();
        stats.total += 1;
        if outcome.is_success() {
            stats.successful += 1;
        }
    }

    Ok(windows)
}

/// Compute time-based uptime over windows of `window_size_seconds`.
///
/// The window size is checked before anything else, so an invalid size is
/// rejected even for empty input.
pub fn compute_window_uptime(
    outcomes: &[Outcome],
    window_size_seconds: i64,
) -> Result<WindowUptime, UptimeError> {
    let windows = bucket_windows(outcomes, window_size_seconds)?;

    let total_windows = windows.len() as u64;
    let up_windows = windows.values().filter(|w| w.is_up()).count() as u64;

    Ok(WindowUptime {
        percentage: percentage(up_windows, total_windows),
        up_windows,
        total_windows,
        window_size_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uptime::test_util::outcomes;

    #[test]
    fn test_mixed_window_is_up() {
        let data = outcomes(&[(0, 200), (1, 500), (65, 200)]);

        let windows = bucket_windows(&data, 60).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[&0], WindowStats { total: 2, successful: 1 });
        assert_eq!(windows[&60], WindowStats { total: 1, successful: 1 });

        let uptime = compute_window_uptime(&data, 60).unwrap();
        assert_eq!(uptime.up_windows, 2);
        assert_eq!(uptime.total_windows, 2);
        assert_eq!(uptime.percentage, 100.0);
        assert_eq!(uptime.window_size_seconds, 60);
    }

    #[test]
    fn test_all_failures_window_is_down() {
        let uptime = compute_window_uptime(&outcomes(&[(0, 500), (30, 500)]), 60).unwrap();
        assert_eq!(uptime.total_windows, 1);
        assert_eq!(uptime.up_windows, 0);
        assert_eq!(uptime.percentage, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let uptime = compute_window_uptime(&[], 60).unwrap();
        assert_eq!(uptime.percentage, 0.0);
        assert_eq!(uptime.up_windows, 0);
        assert_eq!(uptime.total_windows, 0);
    }

    #[test]
    fn test_invalid_window_size() {
        let data = outcomes(&[(0, 200)]);
        assert_eq!(
            compute_window_uptime(&data, 0),
            Err(UptimeError::InvalidWindowSize(0))
        );
        assert_eq!(
            compute_window_uptime(&data, -60),
            Err(UptimeError::InvalidWindowSize(-60))
        );
        // Rejected even when there is nothing to compute.
        assert!(compute_window_uptime(&[], 0).is_err());
    }

    #[test]
    fn test_one_success_among_many_failures() {
        let mut pairs: Vec<(i64, u16)> = (0..99).map(|i| (i % 60, 500)).collect();
        pairs.push((59, 200));

        let uptime = compute_window_uptime(&outcomes(&pairs), 60).unwrap();
        assert_eq!(uptime.total_windows, 1);
        assert_eq!(uptime.up_windows, 1);
    }

    #[test]
    fn test_gaps_do_not_create_windows() {
        // Two probes an hour apart: the empty minutes between them are not down.
        let uptime = compute_window_uptime(&outcomes(&[(0, 200), (3600, 200)]), 60).unwrap();
        assert_eq!(uptime.total_windows, 2);
        assert_eq!(uptime.percentage, 100.0);
    }

    #[test]
    fn test_window_boundaries_are_half_open() {
        let windows = bucket_windows(&outcomes(&[(59, 500), (60, 200), (119, 500)]), 60).unwrap();
        assert_eq!(windows[&0], WindowStats { total: 1, successful: 0 });
        assert_eq!(windows[&60], WindowStats { total: 2, successful: 1 });
    }

    #[test]
    fn test_window_start_floors_before_epoch() {
        let ts = Utc.timestamp_opt(-1, 0).unwrap();
        assert_eq!(window_start(ts, 60), -60);
        assert_eq!(window_start_time(-60), Utc.timestamp_opt(-60, 0).single());
    }

    #[test]
    fn test_window_count_bounded_by_outcomes() {
        let data = outcomes(&[(0, 200), (7, 0), (61, 500), (300, 200), (301, 200), (905, 503)]);
        for size in [1, 5, 60, 300, 86400] {
            let uptime = compute_window_uptime(&data, size).unwrap();
            assert!(uptime.total_windows <= data.len() as u64);
            assert!(uptime.total_windows >= 1);
        }
    }

    #[test]
    fn test_idempotent() {
        let data = outcomes(&[(0, 200), (61, 500), (130, 0)]);
        let first = compute_window_uptime(&data, 60).unwrap();
        let second = compute_window_uptime(&data, 60).unwrap();
        assert_eq!(first, second);
    }
}
