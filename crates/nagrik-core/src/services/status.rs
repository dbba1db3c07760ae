//! Offline status view: connection state, queued reports and the manual
//! sync action.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::connectivity::Connectivity;
use crate::models::{DraftReport, IssueCategory, ReportId, LAST_SYNC_KEY};
use crate::state::SyncState;
use crate::sync::{ReportDelivery, SyncEngine};
use crate::Result;

/// Rough local footprint of one queued report, photos included.
pub const STORAGE_ESTIMATE_MB_PER_REPORT: f64 = 0.5;

/// One row in the queued-reports list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedReport {
    pub id: ReportId,
    pub title: String,
    pub category: IssueCategory,
    pub status_label: &'static str,
    pub created_at: i64,
}

impl From<&DraftReport> for QueuedReport {
    fn from(report: &DraftReport) -> Self {
        Self {
            id: report.id.clone(),
            title: report.display_title().to_string(),
            category: report.category,
            status_label: report.status.label(),
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfflineStatus {
    pub online: bool,
    pub state: SyncState,
    pub last_synced_at: Option<i64>,
    /// Newest first.
    pub queued: Vec<QueuedReport>,
    pub storage_estimate_mb: f64,
}

impl OfflineStatus {
    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }
}

pub struct OfflineStatusView<D> {
    engine: Arc<SyncEngine<D>>,
    connectivity: watch::Receiver<Connectivity>,
}

impl<D: ReportDelivery> OfflineStatusView<D> {
    pub const fn new(
        engine: Arc<SyncEngine<D>>,
        connectivity: watch::Receiver<Connectivity>,
    ) -> Self {
        Self {
            engine,
            connectivity,
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        *self.connectivity.borrow()
    }

    /// Current view of the queue and sync state.
    ///
    /// The last sync time falls back to the persisted value when no pass has
    /// run in this process.
    pub async fn snapshot(&self) -> Result<OfflineStatus> {
        let online = self.connectivity().is_online();
        let status = self.engine.status();
        let store = self.engine.store();

        let mut reports = store.get_all().await?;
        reports.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        let queued = reports.iter().map(QueuedReport::from).collect::<Vec<_>>();

        let last_synced_at = match status.last_synced_at {
            Some(at) => Some(at),
            None => store
                .get_setting(LAST_SYNC_KEY)
                .await?
                .and_then(|value| value.as_integer()),
        };

        #[allow(clippy::cast_precision_loss)]
        let storage_estimate_mb = queued.len() as f64 * STORAGE_ESTIMATE_MB_PER_REPORT;

        Ok(OfflineStatus {
            online,
            state: if online { status.state } else { SyncState::Offline },
            last_synced_at,
            queued,
            storage_estimate_mb,
        })
    }

    /// Run a sync pass now. Does nothing and returns `None` while offline.
    pub async fn manual_sync(&self) -> Result<Option<usize>> {
        if !self.connectivity().is_online() {
            tracing::info!("Manual sync skipped while offline");
            return Ok(None);
        }
        self.engine.sync_pending().await.map(Some)
    }
}
