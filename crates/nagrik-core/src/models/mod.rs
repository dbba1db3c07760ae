//! Data models for Nagrik

mod report;
mod session;
mod settings;

pub use report::{
    DraftReport, DraftStatus, GeoPoint, IssueCategory, MediaRef, ReportId, REPORT_ID_PREFIX,
};
pub use session::{AuthUser, Role, Session};
pub use settings::{Setting, SettingValue, LAST_SYNC_KEY, THEME_KEY};
