//! Shared sync state types.

use serde::Serialize;

use crate::models::ReportId;

/// Sync state shown by the offline status view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No connectivity; sync cannot run.
    Offline,
    /// No pass has run yet.
    #[default]
    Idle,
    Syncing,
    /// The last pass completed and every attempted report was delivered.
    Synced,
    /// The last pass failed or left undelivered reports behind.
    Error,
}

impl SyncState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Offline => "Offline Mode",
            Self::Idle => "Idle",
            Self::Syncing => "Syncing",
            Self::Synced => "Synced",
            Self::Error => "Sync Error",
        }
    }
}

/// Outcome of a single sync pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Pending reports found at the start of the pass.
    pub attempted: usize,
    /// Reports delivered and removed from the local store.
    pub delivered: usize,
    /// Reports left queued after a failed delivery.
    pub failed: Vec<ReportId>,
}

/// Latest sync status published by the sync engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Completion time of the last finished pass (Unix ms).
    pub last_synced_at: Option<i64>,
    pub last_summary: Option<SyncSummary>,
}
