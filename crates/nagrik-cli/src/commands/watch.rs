use std::sync::Arc;

use nagrik_core::connectivity::{Connectivity, ConnectivityMonitor, ReachabilityProbe};
use nagrik_core::state::{SyncState, SyncStatus};

use crate::commands::common::{open_engine, AppContext, CliDelivery};
use crate::error::CliError;

/// Poll the endpoint and sync every time it becomes reachable, until Ctrl-C.
pub async fn run_watch(context: &AppContext) -> Result<(), CliError> {
    let engine = open_engine(context).await?;
    let CliDelivery::Http(delivery) = engine.delivery().clone() else {
        return Err(CliError::SyncNotConfigured);
    };
    println!("Watching {} (Ctrl-C to stop)", delivery.reports_url());

    let (probe, mut connectivity) =
        ReachabilityProbe::spawn(delivery, context.config.probe_interval, Connectivity::Offline);
    let monitor = ConnectivityMonitor::spawn(
        Arc::clone(&engine),
        connectivity.clone(),
        Connectivity::Offline,
    );
    let mut status = engine.subscribe();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *connectivity.borrow_and_update();
                println!("{}", current.label());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                if let Some(line) = format_sync_event(&current) {
                    println!("{line}");
                }
            }
        }
    }

    monitor.abort();
    probe.abort();
    engine.store().close().await;
    Ok(())
}

pub fn format_sync_event(status: &SyncStatus) -> Option<String> {
    match status.state {
        SyncState::Syncing => Some("Syncing queued reports...".to_string()),
        SyncState::Synced => {
            let delivered = status
                .last_summary
                .as_ref()
                .map_or(0, |summary| summary.delivered);
            Some(format!("All reports synced ({delivered} delivered)"))
        }
        SyncState::Error => Some(match &status.last_summary {
            Some(summary) if !summary.failed.is_empty() => format!(
                "Sync finished with {} report(s) still queued",
                summary.failed.len()
            ),
            _ => "Sync failed; reports stay queued".to_string(),
        }),
        SyncState::Idle | SyncState::Offline => None,
    }
}
