//! Sync engine: delivers queued drafts and reconciles the local store.

mod delivery;
#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tokio::sync::{watch, Mutex};

pub use delivery::{
    DeliveryError, DeliveryReceipt, HttpReportDelivery, ReportDelivery, IDEMPOTENCY_KEY_HEADER,
};

use crate::models::{DraftReport, DraftStatus, SettingValue, LAST_SYNC_KEY};
use crate::services::DraftStore;
use crate::state::{SyncState, SyncStatus, SyncSummary};
use crate::util::unix_millis_now;
use crate::Result;

/// Upper bound for a single delivery attempt.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Delivers every `pending_sync` draft and removes the delivered ones.
///
/// Passes are single-flight: a call that arrives while another pass is
/// running waits for it and then only sees what is still pending, so a
/// record is never handed to the endpoint twice by overlapping passes.
pub struct SyncEngine<D> {
    store: DraftStore,
    delivery: D,
    delivery_timeout: Duration,
    in_flight: Mutex<()>,
    status: watch::Sender<SyncStatus>,
}

impl<D: ReportDelivery> SyncEngine<D> {
    pub fn new(store: DraftStore, delivery: D) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            store,
            delivery,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            in_flight: Mutex::new(()),
            status,
        }
    }

    #[must_use]
    pub const fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub const fn store(&self) -> &DraftStore {
        &self.store
    }

    pub const fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Watch the status published after each pass.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Deliver a single report, bounded by the delivery timeout.
    pub async fn deliver(
        &self,
        report: &DraftReport,
    ) -> std::result::Result<DeliveryReceipt, DeliveryError> {
        match tokio::time::timeout(self.delivery_timeout, self.delivery.deliver(report)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(self.delivery_timeout)),
        }
    }

    /// Attempt delivery of every pending draft.
    ///
    /// Returns how many drafts were delivered and removed. Delivery failures
    /// leave the draft queued for the next pass and are not returned as
    /// errors; storage failures are.
    pub async fn sync_pending(&self) -> Result<usize> {
        let _pass = self.in_flight.lock().await;
        self.status.send_modify(|status| status.state = SyncState::Syncing);

        match self.run_pass().await {
            Ok(summary) => {
                let delivered = summary.delivered;
                let finished_at = unix_millis_now();
                if let Err(error) = self
                    .store
                    .put_setting(LAST_SYNC_KEY, &SettingValue::Integer(finished_at))
                    .await
                {
                    tracing::warn!("Failed to record last sync time: {error}");
                }
                self.status.send_modify(|status| {
                    status.state = if summary.failed.is_empty() {
                        SyncState::Synced
                    } else {
                        SyncState::Error
                    };
                    status.last_synced_at = Some(finished_at);
                    status.last_summary = Some(summary);
                });
                Ok(delivered)
            }
            Err(error) => {
                tracing::error!("Sync pass aborted: {error}");
                self.status
                    .send_modify(|status| status.state = SyncState::Error);
                Err(error)
            }
        }
    }

    async fn run_pass(&self) -> Result<SyncSummary> {
        let pending = self
            .store
            .get_all_by_status(DraftStatus::PendingSync)
            .await?;
        let mut summary = SyncSummary {
            attempted: pending.len(),
            ..SyncSummary::default()
        };
        if pending.is_empty() {
            tracing::debug!("No pending reports to sync");
            return Ok(summary);
        }

        tracing::info!(pending = pending.len(), "Syncing pending reports");
        for report in pending {
            match self.deliver(&report).await {
                Ok(receipt) => {
                    if self.store.delete(&report.id).await? {
                        summary.delivered += 1;
                        tracing::info!(
                            report_id = %report.id,
                            duplicate = receipt.duplicate,
                            "Delivered report"
                        );
                    } else {
                        tracing::debug!(report_id = %report.id, "Report already removed");
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        report_id = %report.id,
                        "Delivery failed; report stays queued: {error}"
                    );
                    summary.failed.push(report.id);
                }
            }
        }

        tracing::info!(
            delivered = summary.delivered,
            failed = summary.failed.len(),
            "Sync pass finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::{pending_draft, MockDelivery};
    use super::*;
    use crate::models::ReportId;
    use pretty_assertions::assert_eq;

    async fn engine_with(ids: &[&str], delivery: MockDelivery) -> SyncEngine<MockDelivery> {
        let store = DraftStore::in_memory();
        for id in ids {
            store.put(&pending_draft(id)).await.unwrap();
        }
        SyncEngine::new(store, delivery)
    }

    async fn pending_ids(engine: &SyncEngine<MockDelivery>) -> Vec<String> {
        let mut ids = engine
            .store()
            .get_all_by_status(DraftStatus::PendingSync)
            .await
            .unwrap()
            .into_iter()
            .map(|report| report.id.to_string())
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn partial_failure_keeps_only_failed_reports() {
        let engine = engine_with(&["R1", "R2"], MockDelivery::failing_for(&["R2"])).await;

        let delivered = engine.sync_pending().await.unwrap();

        assert_eq!(delivered, 1);
        let remaining = engine.store().get_all().await.unwrap();
        assert_eq!(
            remaining
                .iter()
                .map(|report| report.id.to_string())
                .collect::<Vec<_>>(),
            vec!["R2"]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pending_count_drops_by_delivered_subset() {
        let ids = ["R1", "R2", "R3", "R4", "R5"];
        let engine = engine_with(&ids, MockDelivery::failing_for(&["R2", "R4", "R5"])).await;

        let before = engine.store().count().await.unwrap();
        let delivered = engine.sync_pending().await.unwrap();
        let after = engine.store().count().await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(before - after, delivered);
        assert_eq!(pending_ids(&engine).await, vec!["R2", "R4", "R5"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_reports_retry_on_next_pass() {
        let delivery = MockDelivery::failing_for(&["R2"]);
        let engine = engine_with(&["R1", "R2"], delivery.clone()).await;

        engine.sync_pending().await.unwrap();
        let second = engine.sync_pending().await.unwrap();

        assert_eq!(second, 0);
        assert_eq!(delivery.calls_for("R1"), 1);
        assert_eq!(delivery.calls_for("R2"), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_passes_deliver_once() {
        let delivery = MockDelivery::succeeding().with_delay(Duration::from_millis(50));
        let engine = Arc::new(engine_with(&["R1"], delivery.clone()).await);

        let first = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.sync_pending().await }
        });
        let second = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.sync_pending().await }
        });

        let total = first.await.unwrap().unwrap() + second.await.unwrap().unwrap();
        assert_eq!(total, 1);
        assert_eq!(delivery.calls_for("R1"), 1);
        assert!(engine.store().get_all().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_delivery_times_out_and_stays_queued() {
        let delivery = MockDelivery::succeeding().with_delay(Duration::from_secs(60));
        let engine = engine_with(&["R1"], delivery)
            .await
            .with_delivery_timeout(Duration::from_millis(100));

        let delivered = engine.sync_pending().await.unwrap();

        assert_eq!(delivered, 0);
        assert_eq!(pending_ids(&engine).await, vec!["R1"]);
        let summary = engine.status().last_summary.unwrap();
        assert_eq!(summary.failed, vec![ReportId::parse("R1").unwrap()]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn status_reflects_last_pass() {
        let engine = engine_with(&["R1", "R2"], MockDelivery::failing_for(&["R2"])).await;
        assert_eq!(engine.status().state, SyncState::Idle);

        engine.sync_pending().await.unwrap();
        let status = engine.status();
        assert_eq!(status.state, SyncState::Error);
        assert!(status.last_synced_at.is_some());
        let summary = status.last_summary.unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 1);

        let stored = engine.store().get_setting(LAST_SYNC_KEY).await.unwrap();
        assert_eq!(
            stored.and_then(|value| value.as_integer()),
            status.last_synced_at
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_queue_is_a_successful_pass() {
        let engine = engine_with(&[], MockDelivery::succeeding()).await;
        assert_eq!(engine.sync_pending().await.unwrap(), 0);
        assert_eq!(engine.status().state, SyncState::Synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn storage_failure_surfaces_from_sync() {
        let engine = engine_with(&["R1"], MockDelivery::succeeding()).await;
        engine.store().close().await;

        let error = engine.sync_pending().await.unwrap_err();
        assert!(error.is_storage_failure());
        assert_eq!(engine.status().state, SyncState::Error);
    }
}
