//! Request-based uptime.

use serde::Serialize;

use super::{percentage, Outcome};

/// Fraction of individual requests that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RequestUptime {
    pub percentage: f64,
    pub successful: u64,
    pub total: u64,
}

impl RequestUptime {
    /// Requests that did not return exactly 200.
    pub fn failed(&self) -> u64 {
        self.total - self.successful
    }
}

/// Compute the success ratio over all outcomes.
///
/// Empty input yields `(0.0, 0, 0)`. Order does not matter.
pub fn compute_request_uptime(outcomes: &[Outcome]) -> RequestUptime {
    let total = outcomes.len() as u64;
    let successful = outcomes.iter().filter(|o| o.is_success()).count() as u64;

    RequestUptime {
        percentage: percentage(successful, total),
        successful,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uptime::test_util::outcomes;

    #[test]
    fn test_empty_input() {
        let uptime = compute_request_uptime(&[]);
        assert_eq!(uptime, RequestUptime { percentage: 0.0, successful: 0, total: 0 });
    }

    #[test]
    fn test_mixed_outcomes() {
        let uptime = compute_request_uptime(&outcomes(&[(0, 200), (1, 500), (65, 200)]));
        assert_eq!(uptime.successful, 2);
        assert_eq!(uptime.total, 3);
        assert_eq!(uptime.failed(), 1);
        assert!((uptime.percentage - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_only_exact_200_counts() {
        let uptime = compute_request_uptime(&outcomes(&[(0, 200), (1, 201), (2, 204), (3, 299)]));
        assert_eq!(uptime.successful, 1);
        assert_eq!(uptime.percentage, 25.0);
    }

    #[test]
    fn test_full_uptime_iff_all_success() {
        let all_ok = compute_request_uptime(&outcomes(&[(0, 200), (10, 200), (20, 200)]));
        assert_eq!(all_ok.percentage, 100.0);

        let one_bad = compute_request_uptime(&outcomes(&[(0, 200), (10, 0), (20, 200)]));
        assert!(one_bad.percentage < 100.0);
    }

    #[test]
    fn test_percentage_bounds() {
        let cases: [&[(i64, u16)]; 4] = [
            &[(0, 500)],
            &[(0, 200)],
            &[(0, 200), (1, 0), (2, 503)],
            &[(0, 0), (1, 0)],
        ];
        for case in cases {
            let uptime = compute_request_uptime(&outcomes(case));
            assert!((0.0..=100.0).contains(&uptime.percentage));
        }
    }

    #[test]
    fn test_order_independent() {
        let forward = outcomes(&[(0, 200), (1, 500), (2, 0)]);
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(compute_request_uptime(&forward), compute_request_uptime(&reversed));
    }
}
