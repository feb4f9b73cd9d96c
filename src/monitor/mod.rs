//! Monitoring loop: probes the endpoint on a fixed interval and records
//! every outcome in the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::db::{DbError, NewRequestLog, Store};
use crate::probe::HttpProbe;

/// Totals for one monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub requests: u64,
    pub successful: u64,
    pub elapsed: Duration,
}

/// Drives the probe for a bounded run.
pub struct Monitor {
    store: Arc<Store>,
    probe: HttpProbe,
    names: Vec<String>,
    interval: Duration,
    duration: Duration,
}

impl Monitor {
    pub fn new(
        store: Arc<Store>,
        probe: HttpProbe,
        names: Vec<String>,
        interval: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            store,
            probe,
            names,
            interval,
            duration,
        }
    }

    /// Run until the configured duration elapses or Ctrl-C is pressed.
    pub async fn run(&self) -> Result<RunSummary, DbError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Interrupted, stopping monitor");
        })
        .await
    }

    /// Run until the configured duration elapses or `stop` completes.
    pub async fn run_until<F: Future<Output = ()>>(&self, stop: F) -> Result<RunSummary, DbError> {
        tracing::info!(
            "Monitoring {} every {:?} for {:?}",
            self.probe.url(),
            self.interval,
            self.duration
        );

        let started = Instant::now();
        // A run too long to put on the clock just runs until stopped.
        let deadline = started.checked_add(self.duration);

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(stop);

        let mut requests = 0u64;
        let mut successful = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = sleep_until_deadline(deadline) => break,
                _ = interval.tick() => {
                    let name = self.next_name(requests);
                    if self.probe_once(name).await? {
                        successful += 1;
                    }
                    requests += 1;

                    // No point waiting for a tick that lands past the deadline.
                    if let Some(deadline) = deadline {
                        match Instant::now().checked_add(self.interval) {
                            Some(next) if next < deadline => {}
                            _ => break,
                        }
                    }
                }
            }
        }

        let summary = RunSummary {
            requests,
            successful,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Monitoring completed: {} requests ({} successful) in {:.1} minutes",
            summary.requests,
            summary.successful,
            summary.elapsed.as_secs_f64() / 60.0
        );
        Ok(summary)
    }

    fn next_name(&self, request_count: u64) -> &str {
        if self.names.is_empty() {
            return crate::names::FALLBACK_NAME;
        }
        &self.names[(request_count % self.names.len() as u64) as usize]
    }

    /// Probe once and store the outcome. Returns whether it succeeded.
    async fn probe_once(&self, name: &str) -> Result<bool, DbError> {
        let timestamp = Utc::now();
        let response = self.probe.check(name).await;

        if response.is_success() {
            tracing::info!("✓ {:?} status {} {}", name, response.status, response.preview(50));
        } else {
            tracing::warn!("✗ {:?} status {} {}", name, response.status, response.preview(50));
        }

        self.store.add_request_log(&NewRequestLog {
            timestamp,
            url: self.probe.url().to_string(),
            name_parameter: name.to_string(),
            response_status: response.status,
            response_text: response.body.clone(),
        })?;

        Ok(response.is_success())
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use tokio_test::assert_ok;

    async fn flaky_server() -> String {
        // Succeeds for "Alice", fails for everyone else.
        let router = Router::new().route(
            "/check",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body["name"] == "Alice" {
                    (StatusCode::OK, "ok")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "System is down")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/check", addr)
    }

    fn monitor(store: Arc<Store>, url: &str, names: &[&str], duration: Duration) -> Monitor {
        Monitor::new(
            store,
            HttpProbe::new(url, Duration::from_secs(5)).unwrap(),
            names.iter().map(|n| n.to_string()).collect(),
            Duration::from_millis(50),
            duration,
        )
    }

    #[tokio::test]
    async fn test_run_records_outcomes_round_robin() {
        let url = flaky_server().await;
        let store = Arc::new(Store::in_memory().unwrap());
        let m = monitor(store.clone(), &url, &["Alice", "Bob"], Duration::from_millis(400));

        let summary = assert_ok!(m.run_until(std::future::pending()).await);
        assert!(summary.requests >= 2);

        let mut logs = store.recent_logs(100).unwrap();
        logs.reverse();
        assert_eq!(logs.len() as u64, summary.requests);
        assert_eq!(logs[0].name_parameter, "Alice");
        assert_eq!(logs[0].response_status, 200);
        assert_eq!(logs[1].name_parameter, "Bob");
        assert_eq!(logs[1].response_status, 500);
        assert_eq!(logs[1].response_text, "System is down");

        let outcomes = store.fetch_ordered_outcomes().unwrap();
        let ok = outcomes.iter().filter(|o| o.is_success()).count() as u64;
        assert_eq!(ok, summary.successful);
    }

    #[tokio::test]
    async fn test_stop_signal_ends_run() {
        let url = flaky_server().await;
        let store = Arc::new(Store::in_memory().unwrap());
        let m = monitor(store.clone(), &url, &["Alice"], Duration::from_secs(60));

        let summary = assert_ok!(m.run_until(async {}).await);
        assert_eq!(summary.requests, 0);
        assert!(store.fetch_time_range().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrepresentable_duration_runs_until_stopped() {
        let url = flaky_server().await;
        let store = Arc::new(Store::in_memory().unwrap());
        let m = Monitor::new(
            store.clone(),
            HttpProbe::new(&url, Duration::from_secs(5)).unwrap(),
            vec!["Alice".to_string()],
            Duration::from_millis(50),
            Duration::MAX,
        );

        let stop = tokio::time::sleep(Duration::from_millis(200));
        let summary = assert_ok!(m.run_until(stop).await);
        assert!(summary.requests >= 1);
        assert_eq!(store.recent_logs(100).unwrap().len() as u64, summary.requests);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_recorded_as_zero() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let store = Arc::new(Store::in_memory().unwrap());
        let m = monitor(store.clone(), &url, &[], Duration::from_millis(120));
        let summary = m.run_until(std::future::pending()).await.unwrap();
        assert!(summary.requests >= 1);

        let logs = store.recent_logs(1).unwrap();
        assert_eq!(logs[0].response_status, 0);
        assert_eq!(logs[0].name_parameter, crate::names::FALLBACK_NAME);
    }
}
