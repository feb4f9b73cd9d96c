//! Loading a report from the store.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::{DbError, Store};
use crate::uptime::{bucket_windows, Outcome, Report, UptimeError, WindowStats};

/// Report generation error types.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Uptime(#[from] UptimeError),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// A computed report together with the outcomes it was computed from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub outcomes: Vec<Outcome>,
    pub report: Report,
}

impl Snapshot {
    /// Read everything from the store and run the calculators.
    ///
    /// Returns `None` when the store holds no outcomes yet.
    pub fn load(store: &Store, window_size_seconds: i64) -> Result<Option<Self>, ReportError> {
        let Some((time_range, outcomes)) = store.fetch_snapshot()? else {
            return Ok(None);
        };

        let report = Report::assemble(&outcomes, time_range, window_size_seconds)?;
        tracing::debug!(
            "Computed report over {} outcomes in {} windows",
            outcomes.len(),
            report.window_uptime.total_windows
        );

        Ok(Some(Self { outcomes, report }))
    }

    /// Per-window stats using the report's window size.
    pub fn windows(&self) -> Result<BTreeMap<i64, WindowStats>, UptimeError> {
        bucket_windows(&self.outcomes, self.report.window_uptime.window_size_seconds)
    }
}
