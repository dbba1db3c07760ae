use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] nagrik_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No report description provided")]
    EmptyDescription,
    #[error("Report ID cannot be empty")]
    EmptyReportId,
    #[error("No queued report with id: {0}")]
    ReportNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `nagrik config set --api-url <URL>` or set NAGRIK_API_URL."
    )]
    SyncNotConfigured,
}
