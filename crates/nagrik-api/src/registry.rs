//! In-memory record of received reports, keyed by report id.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use nagrik_core::{DraftReport, ReportId};
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceivedReport {
    pub report: DraftReport,
    /// First receipt time (Unix ms)
    pub received_at: i64,
    /// Deliveries of the same id after the first
    pub duplicate_deliveries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Created { received_at: i64 },
    Duplicate { received_at: i64 },
}

impl Receipt {
    pub const fn is_duplicate(self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    pub const fn received_at(self) -> i64 {
        match self {
            Self::Created { received_at } | Self::Duplicate { received_at } => received_at,
        }
    }
}

#[derive(Clone, Default)]
pub struct ReportRegistry {
    reports: Arc<RwLock<HashMap<ReportId, ReceivedReport>>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivery. The first copy of an id wins; later copies only
    /// bump the duplicate counter.
    pub async fn record(&self, report: DraftReport) -> Receipt {
        let mut reports = self.reports.write().await;
        if let Some(existing) = reports.get_mut(&report.id) {
            existing.duplicate_deliveries = existing.duplicate_deliveries.saturating_add(1);
            return Receipt::Duplicate {
                received_at: existing.received_at,
            };
        }

        let received_at = Utc::now().timestamp_millis();
        reports.insert(
            report.id.clone(),
            ReceivedReport {
                report,
                received_at,
                duplicate_deliveries: 0,
            },
        );
        Receipt::Created { received_at }
    }

    pub async fn contains(&self, id: &ReportId) -> bool {
        self.reports.read().await.contains_key(id)
    }

    pub async fn get(&self, id: &ReportId) -> Option<ReceivedReport> {
        self.reports.read().await.get(id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.reports.read().await.len()
    }
}
