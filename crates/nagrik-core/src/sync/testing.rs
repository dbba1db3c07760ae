//! In-process delivery double for sync tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{DeliveryError, DeliveryReceipt, ReportDelivery};
use crate::models::{DraftReport, IssueCategory, ReportId};

#[derive(Clone, Default)]
pub struct MockDelivery {
    failing: Arc<HashSet<String>>,
    reject_all: bool,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockDelivery {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: Arc::new(ids.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn rejecting_all() -> Self {
        Self {
            reject_all: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| *call == id)
            .count()
    }
}

impl ReportDelivery for MockDelivery {
    async fn deliver(&self, report: &DraftReport) -> Result<DeliveryReceipt, DeliveryError> {
        self.calls.lock().unwrap().push(report.id.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.reject_all || self.failing.contains(report.id.as_str()) {
            Err(DeliveryError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            })
        } else {
            Ok(DeliveryReceipt::default())
        }
    }
}

pub fn pending_draft(id: &str) -> DraftReport {
    DraftReport::new(
        ReportId::parse(id).unwrap(),
        IssueCategory::Roads,
        "Broken streetlight",
    )
}
