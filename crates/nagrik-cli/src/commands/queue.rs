use std::path::Path;

use nagrik_core::services::QueuedReport;

use crate::commands::common::{
    format_queue_lines, format_report_details, normalize_report_id, now_ms, open_store,
};
use crate::error::CliError;

pub async fn list_queue(db_path: &Path) -> Result<Vec<QueuedReport>, CliError> {
    let store = open_store(db_path).await?;
    let mut reports = store.get_all().await?;
    reports.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    Ok(reports.iter().map(QueuedReport::from).collect())
}

pub async fn run_queue_list(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let queued = list_queue(db_path).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&queued)?);
        return Ok(());
    }

    if queued.is_empty() {
        println!("No reports waiting to sync.");
        return Ok(());
    }

    for line in format_queue_lines(&queued, now_ms()) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_queue_show(id: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let id = normalize_report_id(id)?;
    let store = open_store(db_path).await?;
    let report = store
        .get(&id)
        .await?
        .ok_or_else(|| CliError::ReportNotFound(id.to_string()))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_details(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_queue_remove(id: &str, db_path: &Path) -> Result<(), CliError> {
    let id = normalize_report_id(id)?;
    let store = open_store(db_path).await?;
    if !store.delete(&id).await? {
        return Err(CliError::ReportNotFound(id.to_string()));
    }
    println!("{id}");
    Ok(())
}
