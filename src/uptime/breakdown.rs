//! Error breakdown by status code.

use std::collections::HashMap;

use serde::Serialize;

use super::{percentage, Outcome};

/// Number of outcomes that returned a given non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorCount {
    pub status_code: u16,
    pub count: u64,
}

impl ErrorCount {
    /// Share of all outcomes (not only of errors) with this status.
    pub fn percentage_of(&self, total_outcomes: u64) -> f64 {
        percentage(self.count, total_outcomes)
    }
}

/// Non-success outcomes grouped by status code.
///
/// Entries are ordered by count descending, then by status code ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorSummary {
    entries: Vec<ErrorCount>,
}

impl ErrorSummary {
    pub fn iter(&self) -> impl Iterator<Item = &ErrorCount> {
        self.entries.iter()
    }

    pub fn get(&self, status_code: u16) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.status_code == status_code)
            .map(|e| e.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of failed outcomes across all codes.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Tally every outcome whose status is not exactly 200.
///
/// Transport failures (status 0) get their own bucket.
pub fn summarize_errors(outcomes: &[Outcome]) -> ErrorSummary {
    let mut counts: HashMap<u16, u64> = HashMap::new();
    for outcome in outcomes.iter().filter(|o| !o.is_success()) {
        *counts.entry(outcome.status_code).or_default() += 1;
    }

    let mut entries: Vec<ErrorCount> = counts
        .into_iter()
        .map(|(status_code, count)| ErrorCount { status_code, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.status_code.cmp(&b.status_code)));

    ErrorSummary { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uptime::test_util::outcomes;

    #[test]
    fn test_summarize_excludes_success() {
        let summary = summarize_errors(&outcomes(&[(0, 200), (1, 500), (2, 500), (3, 0)]));
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get(500), Some(2));
        assert_eq!(summary.get(0), Some(1));
        assert_eq!(summary.get(200), None);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_ordering_by_count_then_code() {
        let summary = summarize_errors(&outcomes(&[
            (0, 503),
            (1, 500),
            (2, 404),
            (3, 500),
            (4, 0),
            (5, 404),
        ]));
        let order: Vec<(u16, u64)> = summary.iter().map(|e| (e.status_code, e.count)).collect();
        assert_eq!(order, vec![(404, 2), (500, 2), (0, 1), (503, 1)]);
    }

    #[test]
    fn test_empty_and_all_success() {
        assert!(summarize_errors(&[]).is_empty());
        assert!(summarize_errors(&outcomes(&[(0, 200), (1, 200)])).is_empty());
    }

    #[test]
    fn test_percentage_of_total_outcomes() {
        let data = outcomes(&[(0, 200), (1, 500), (2, 500), (3, 0)]);
        let summary = summarize_errors(&data);
        let first = summary.iter().next().unwrap();
        assert_eq!(first.status_code, 500);
        assert_eq!(first.percentage_of(data.len() as u64), 50.0);
        assert_eq!(first.percentage_of(0), 0.0);
    }

    #[test]
    fn test_serializes_as_list() {
        let summary = summarize_errors(&outcomes(&[(0, 500)]));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, serde_json::json!([{ "status_code": 500, "count": 1 }]));
    }
}
