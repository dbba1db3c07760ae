use std::sync::Arc;

use nagrik_core::services::{OfflineStatus, OfflineStatusView};
use tokio::sync::watch;

use crate::commands::common::{
    detect_connectivity, format_queue_lines, format_relative_time, format_sync_timestamp, now_ms,
    open_engine, AppContext,
};
use crate::error::CliError;

pub async fn load_status(context: &AppContext) -> Result<OfflineStatus, CliError> {
    let engine = open_engine(context).await?;
    let connectivity = detect_connectivity(engine.delivery(), context.force_offline).await;
    let (_signals, receiver) = watch::channel(connectivity);
    Ok(OfflineStatusView::new(engine, receiver).snapshot().await?)
}

pub async fn run_status(context: &AppContext, as_json: bool) -> Result<(), CliError> {
    let status = load_status(context).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        for line in format_status_lines(&status, now_ms()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_status_lines(status: &OfflineStatus, now_ms: i64) -> Vec<String> {
    let connection = if status.online {
        "Connected"
    } else {
        "Offline Mode"
    };
    let last_sync = status.last_synced_at.map_or_else(
        || "never".to_string(),
        |at| {
            format!(
                "{} ({})",
                format_sync_timestamp(at),
                format_relative_time(at, now_ms)
            )
        },
    );

    let mut lines = vec![
        format!("Connection:      {connection}"),
        format!("Sync state:      {}", status.state.label()),
        format!("Last sync:       {last_sync}"),
        format!("Queued reports:  {}", status.queued_count()),
        format!("Storage used:    {:.1} MB", status.storage_estimate_mb),
    ];
    if !status.queued.is_empty() {
        lines.push(String::new());
        lines.extend(format_queue_lines(&status.queued, now_ms));
    }
    lines
}
