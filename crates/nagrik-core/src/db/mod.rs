//! Database layer for Nagrik

mod connection;
mod migrations;
mod report_repository;
mod settings_repository;

pub use connection::Database;
pub use migrations::CURRENT_VERSION as SCHEMA_VERSION;
pub use report_repository::{LibSqlReportRepository, ReportRepository};
pub use settings_repository::{LibSqlSettingsRepository, SettingsRepository};
