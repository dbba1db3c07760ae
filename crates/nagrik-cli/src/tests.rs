use std::time::Duration;

use nagrik_core::config::{ClientConfig, ClientConfigFile};
use nagrik_core::models::{DraftStatus, IssueCategory, SettingValue};
use nagrik_core::services::{OfflineStatus, QueuedReport, Submission};
use nagrik_core::state::{SyncState, SyncStatus, SyncSummary};
use nagrik_core::ReportId;
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use crate::cli::CompletionShell;
use crate::commands::common::{
    format_queue_lines, format_relative_time, format_sync_timestamp, normalize_report_id,
    open_store, truncate, AppContext, CliDelivery,
};
use crate::commands::completions::render_completions;
use crate::commands::config_cmd::{run_config_set, ConfigUpdate};
use crate::commands::queue::{list_queue, run_queue_remove};
use crate::commands::report::{run_report, ReportArgs};
use crate::commands::setting::run_setting_set;
use crate::commands::status::{format_status_lines, load_status};
use crate::commands::sync::run_sync;
use crate::commands::watch::format_sync_event;
use crate::error::CliError;

fn offline_context(tmp: &TempDir) -> AppContext {
    AppContext {
        db_path: tmp.path().join("nagrik.db"),
        config_path: tmp.path().join("config.json"),
        config: ClientConfig::default(),
        force_offline: true,
    }
}

fn report_args(description: &str) -> ReportArgs {
    ReportArgs {
        category: IssueCategory::Roads,
        title: None,
        location: None,
        address: Some("MG Road".to_string()),
        photos: Vec::new(),
        voice_note: None,
        description: vec![description.to_string()],
    }
}

fn queued(id: &str, title: &str, created_at: i64) -> QueuedReport {
    QueuedReport {
        id: ReportId::parse(id).unwrap(),
        title: title.to_string(),
        category: IssueCategory::Sanitation,
        status_label: DraftStatus::PendingSync.label(),
        created_at,
    }
}

#[test]
fn normalize_report_id_rejects_empty() {
    assert!(matches!(
        normalize_report_id(" \n "),
        Err(CliError::EmptyReportId)
    ));
    assert_eq!(normalize_report_id(" NRK-1 ").unwrap().as_str(), "NRK-1");
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn format_sync_timestamp_returns_utc_label() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn truncate_adds_ellipsis() {
    assert_eq!(
        truncate("Garbage   not collected for two weeks", 20),
        "Garbage not colle..."
    );
    assert_eq!(truncate("Short", 20), "Short");
}

#[test]
fn queue_lines_include_id_title_and_badge() {
    let lines = format_queue_lines(&[queued("NRK-1", "Overflowing bin", 0)], 120_000);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("NRK-1 "));
    assert!(lines[0].contains("Overflowing bin"));
    assert!(lines[0].contains("Sanitation"));
    assert!(lines[0].contains("2m ago"));
    assert!(lines[0].ends_with("[Pending Sync]"));
}

#[test]
fn status_lines_show_offline_summary() {
    let status = OfflineStatus {
        online: false,
        state: SyncState::Offline,
        last_synced_at: None,
        queued: vec![queued("NRK-1", "Overflowing bin", 0)],
        storage_estimate_mb: 0.5,
    };

    let lines = format_status_lines(&status, 60_000);
    assert_eq!(lines[0], "Connection:      Offline Mode");
    assert_eq!(lines[2], "Last sync:       never");
    assert_eq!(lines[3], "Queued reports:  1");
    assert_eq!(lines[4], "Storage used:    0.5 MB");
    assert!(lines.last().unwrap().contains("NRK-1"));
}

#[test]
fn sync_events_describe_pass_outcome() {
    let synced = SyncStatus {
        state: SyncState::Synced,
        last_synced_at: Some(1),
        last_summary: Some(SyncSummary {
            attempted: 2,
            delivered: 2,
            failed: Vec::new(),
        }),
    };
    assert_eq!(
        format_sync_event(&synced).as_deref(),
        Some("All reports synced (2 delivered)")
    );

    let partial = SyncStatus {
        state: SyncState::Error,
        last_synced_at: Some(1),
        last_summary: Some(SyncSummary {
            attempted: 2,
            delivered: 1,
            failed: vec![ReportId::parse("R2").unwrap()],
        }),
    };
    assert_eq!(
        format_sync_event(&partial).as_deref(),
        Some("Sync finished with 1 report(s) still queued")
    );
    assert_eq!(format_sync_event(&SyncStatus::default()), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn offline_report_is_queued_and_listed() {
    let tmp = tempdir().unwrap();
    let context = offline_context(&tmp);

    let submission = run_report(&context, report_args("Deep pothole near bus stop"))
        .await
        .unwrap();
    let Submission::Queued(id) = submission else {
        panic!("offline report should be queued");
    };

    let queue = list_queue(&context.db_path).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, id);
    assert_eq!(queue[0].title, IssueCategory::Roads.label());

    let stored = open_store(&context.db_path)
        .await
        .unwrap()
        .get(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.address, "MG Road");
    assert_eq!(stored.status, DraftStatus::PendingSync);
}

#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_endpoint_queues_even_when_online() {
    let tmp = tempdir().unwrap();
    let context = AppContext {
        force_offline: false,
        ..offline_context(&tmp)
    };

    let submission = run_report(&context, report_args("Streetlight out"))
        .await
        .unwrap();

    assert!(matches!(submission, Submission::Queued(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn queue_remove_deletes_once() {
    let tmp = tempdir().unwrap();
    let context = offline_context(&tmp);
    let submission = run_report(&context, report_args("Broken footpath"))
        .await
        .unwrap();
    let id = submission.id().to_string();

    run_queue_remove(&id, &context.db_path).await.unwrap();
    assert!(list_queue(&context.db_path).await.unwrap().is_empty());
    assert!(matches!(
        run_queue_remove(&id, &context.db_path).await,
        Err(CliError::ReportNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_reflects_queue_and_forced_offline() {
    let tmp = tempdir().unwrap();
    let context = offline_context(&tmp);
    run_report(&context, report_args("Open manhole"))
        .await
        .unwrap();
    run_report(&context, report_args("Fallen tree"))
        .await
        .unwrap();

    let status = load_status(&context).await.unwrap();
    assert!(!status.online);
    assert_eq!(status.state, SyncState::Offline);
    assert_eq!(status.queued_count(), 2);
    assert!((status.storage_estimate_mb - 1.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_requires_configured_endpoint() {
    let tmp = tempdir().unwrap();
    let context = offline_context(&tmp);
    assert!(matches!(
        run_sync(&context).await,
        Err(CliError::SyncNotConfigured)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn forced_offline_sync_keeps_queue() {
    let tmp = tempdir().unwrap();
    let context = AppContext {
        config: ClientConfig {
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            delivery_timeout: Duration::from_secs(1),
            ..ClientConfig::default()
        },
        ..offline_context(&tmp)
    };
    run_report(&context, report_args("Water leak")).await.unwrap();

    assert_eq!(run_sync(&context).await.unwrap(), 0);
    assert_eq!(list_queue(&context.db_path).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn setting_set_infers_value_type() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("nagrik.db");

    let value = run_setting_set("notifications", "true", &db_path)
        .await
        .unwrap();
    assert_eq!(value, SettingValue::Bool(true));

    run_setting_set("theme", "dark", &db_path).await.unwrap();
    let store = open_store(&db_path).await.unwrap();
    assert_eq!(
        store.get_setting("theme").await.unwrap(),
        Some(SettingValue::Text("dark".to_string()))
    );
}

#[test]
fn config_set_merges_and_validates() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nagrik").join("config.json");

    run_config_set(
        ConfigUpdate {
            api_url: Some("https://reports.example.com/".to_string()),
            ..ConfigUpdate::default()
        },
        &path,
    )
    .unwrap();
    let merged = run_config_set(
        ConfigUpdate {
            delivery_timeout_secs: Some(30),
            ..ConfigUpdate::default()
        },
        &path,
    )
    .unwrap();
    assert_eq!(
        merged,
        ClientConfigFile {
            api_base_url: Some("https://reports.example.com".to_string()),
            delivery_timeout_secs: Some(30),
            ..ClientConfigFile::default()
        }
    );

    let rejected = run_config_set(
        ConfigUpdate {
            api_url: Some("reports.example.com".to_string()),
            ..ConfigUpdate::default()
        },
        &path,
    );
    assert!(matches!(rejected, Err(CliError::Config(_))));
}

#[test]
fn unconfigured_delivery_is_reported() {
    let delivery = CliDelivery::from_config(&ClientConfig::default()).unwrap();
    assert!(!delivery.is_configured());

    let configured = CliDelivery::from_config(&ClientConfig {
        api_base_url: Some("https://reports.example.com".to_string()),
        ..ClientConfig::default()
    })
    .unwrap();
    assert!(configured.is_configured());
}

#[test]
fn bash_completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("_nagrik()"));
    assert!(script.contains("complete -F _nagrik"));
}
