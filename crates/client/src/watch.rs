//! Polling watchers for pages that refresh while open.
//!
//! A watcher fetches on every tick, forwards a value only when it differs
//! from the last one sent, and stops when its token is cancelled or the
//! receiver goes away. Fetch errors are logged and the next tick tries again.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use vocatrack_core::report::AttendanceReport;
use vocatrack_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::ScanHistoryEntry;

/// Reads that watchers poll.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn group_report(&self, group_id: DbId) -> Result<AttendanceReport, ClientError>;
    async fn scan_history(&self) -> Result<Vec<ScanHistoryEntry>, ClientError>;
}

#[async_trait]
impl ReportSource for ApiClient {
    async fn group_report(&self, group_id: DbId) -> Result<AttendanceReport, ClientError> {
        ApiClient::group_report(self, group_id).await
    }

    async fn scan_history(&self) -> Result<Vec<ScanHistoryEntry>, ClientError> {
        ApiClient::scan_history(self).await
    }
}

/// Poll a group's attendance report every `every`
/// ([`vocatrack_core::cache_keys::REPORT_POLL`] on the report page).
pub async fn watch_group_report<S: ReportSource>(
    source: &S,
    group_id: DbId,
    every: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<AttendanceReport>,
) {
    poll_changes("group_report", every, cancel, tx, || source.group_report(group_id)).await
}

/// Poll the student's scan history every `every`
/// ([`vocatrack_core::cache_keys::SCAN_HISTORY_POLL`] on the scan page).
pub async fn watch_scan_history<S: ReportSource>(
    source: &S,
    every: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<Vec<ScanHistoryEntry>>,
) {
    poll_changes("scan_history", every, cancel, tx, || source.scan_history()).await
}

async fn poll_changes<T, F, Fut>(
    name: &'static str,
    every: Duration,
    cancel: CancellationToken,
    tx: mpsc::Sender<T>,
    mut fetch: F,
) where
    T: Clone + PartialEq,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<T> = None;

    tracing::debug!(watcher = name, interval_ms = every.as_millis() as u64, "Watcher started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(watcher = name, "Watcher cancelled");
                break;
            }
            _ = interval.tick() => {
                match fetch().await {
                    Ok(value) if last.as_ref() != Some(&value) => {
                        if tx.send(value.clone()).await.is_err() {
                            tracing::debug!(watcher = name, "Watcher receiver dropped");
                            break;
                        }
                        last = Some(value);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(watcher = name, error = %e, "Watcher fetch failed");
                    }
                }
            }
        }
    }
}
