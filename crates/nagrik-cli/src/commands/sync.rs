use std::sync::Arc;

use nagrik_core::services::OfflineStatusView;
use tokio::sync::watch;

use crate::commands::common::{detect_connectivity, open_engine, AppContext};
use crate::error::CliError;

/// Run one sync pass. Returns how many reports were delivered.
pub async fn run_sync(context: &AppContext) -> Result<usize, CliError> {
    if context.config.api_base_url.is_none() {
        return Err(CliError::SyncNotConfigured);
    }

    let engine = open_engine(context).await?;
    let connectivity = detect_connectivity(engine.delivery(), context.force_offline).await;
    let (_signals, receiver) = watch::channel(connectivity);
    let view = OfflineStatusView::new(Arc::clone(&engine), receiver);

    let Some(delivered) = view.manual_sync().await? else {
        let queued = engine.store().count().await?;
        println!("Offline: {queued} report(s) remain queued.");
        return Ok(0);
    };

    let failed = engine
        .status()
        .last_summary
        .map_or(0, |summary| summary.failed.len());
    if failed == 0 {
        println!("Sync completed: {delivered} report(s) delivered");
    } else {
        println!("Sync completed: {delivered} report(s) delivered, {failed} still queued");
    }
    Ok(delivered)
}
