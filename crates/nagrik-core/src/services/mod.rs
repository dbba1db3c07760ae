//! Services shared by client hosts.

mod composer;
mod draft_store;
mod status;

pub use composer::{ReportComposer, ReportForm, Submission};
pub use draft_store::{DraftStore, StoreLocation};
pub use status::{OfflineStatus, OfflineStatusView, QueuedReport, STORAGE_ESTIMATE_MB_PER_REPORT};
