use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use nagrik_core::config::ClientConfig;
use nagrik_core::connectivity::{Connectivity, ReachabilityCheck};
use nagrik_core::services::{DraftStore, QueuedReport};
use nagrik_core::sync::{DeliveryError, DeliveryReceipt, HttpReportDelivery, ReportDelivery};
use nagrik_core::util::normalize_text;
use nagrik_core::{DraftReport, ReportId, SyncEngine};

use crate::error::CliError;

/// Everything a command needs to reach the store and the endpoint.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub config: ClientConfig,
    pub force_offline: bool,
}

/// Delivery used by the CLI. Without a configured endpoint every delivery
/// fails, so reports stay queued.
#[derive(Debug, Clone)]
pub enum CliDelivery {
    Http(HttpReportDelivery),
    Unconfigured,
}

impl CliDelivery {
    pub fn from_config(config: &ClientConfig) -> Result<Self, CliError> {
        if config.api_base_url.is_none() {
            return Ok(Self::Unconfigured);
        }
        HttpReportDelivery::from_config(config)
            .map(Self::Http)
            .map_err(|error| CliError::Config(error.to_string()))
    }

    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl ReportDelivery for CliDelivery {
    async fn deliver(&self, report: &DraftReport) -> Result<DeliveryReceipt, DeliveryError> {
        match self {
            Self::Http(delivery) => delivery.deliver(report).await,
            Self::Unconfigured => Err(DeliveryError::InvalidConfiguration(
                "no reporting endpoint configured".to_string(),
            )),
        }
    }
}

impl ReachabilityCheck for CliDelivery {
    async fn is_reachable(&self) -> bool {
        match self {
            Self::Http(delivery) => delivery.probe().await,
            Self::Unconfigured => false,
        }
    }
}

pub async fn open_store(path: &Path) -> Result<DraftStore, CliError> {
    let store = DraftStore::at_path(path);
    store.open().await?;
    Ok(store)
}

pub async fn open_engine(context: &AppContext) -> Result<Arc<SyncEngine<CliDelivery>>, CliError> {
    let store = open_store(&context.db_path).await?;
    let delivery = CliDelivery::from_config(&context.config)?;
    Ok(Arc::new(
        SyncEngine::new(store, delivery).with_delivery_timeout(context.config.delivery_timeout),
    ))
}

/// Probe the endpoint once, unless the user forced offline mode.
pub async fn detect_connectivity<C: ReachabilityCheck>(
    check: &C,
    force_offline: bool,
) -> Connectivity {
    if force_offline {
        return Connectivity::Offline;
    }
    if check.is_reachable().await {
        Connectivity::Online
    } else {
        tracing::info!("Reporting endpoint unreachable; working offline");
        Connectivity::Offline
    }
}

pub fn format_queue_lines(reports: &[QueuedReport], now_ms: i64) -> Vec<String> {
    reports
        .iter()
        .map(|report| {
            let id = report.id.to_string();
            let title = truncate(&report.title, 32);
            let category = report.category.label();
            let relative_time = format_relative_time(report.created_at, now_ms);
            format!(
                "{id:<42}  {title:<32}  {category:<22}  {relative_time:<10}  [{}]",
                report.status_label
            )
        })
        .collect()
}

pub fn format_report_details(report: &DraftReport) -> Vec<String> {
    let mut lines = vec![
        format!("ID:          {}", report.id),
        format!("Title:       {}", report.display_title()),
        format!("Category:    {}", report.category.label()),
        format!("Status:      {}", report.status.label()),
        format!("Created:     {}", format_sync_timestamp(report.created_at)),
        format!("Updated:     {}", format_sync_timestamp(report.updated_at)),
    ];
    if let Some(location) = report.location {
        lines.push(format!("Location:    {location}"));
    }
    if !report.address.trim().is_empty() {
        lines.push(format!("Address:     {}", report.address));
    }
    for photo in &report.photos {
        lines.push(format!("Photo:       {photo}"));
    }
    if let Some(voice_note) = &report.voice_note {
        lines.push(format!("Voice note:  {voice_note}"));
    }
    lines.push(String::new());
    lines.push(report.description.clone());
    lines
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn resolve_description(parts: &[String]) -> Result<String, CliError> {
    if let Some(description) = normalize_text(&parts.join(" ")) {
        return Ok(description);
    }
    if let Some(description) = read_piped_stdin()? {
        return Ok(description);
    }
    Err(CliError::EmptyDescription)
}

pub fn normalize_report_id(id: &str) -> Result<ReportId, CliError> {
    ReportId::parse(id.trim()).map_err(|_| CliError::EmptyReportId)
}

fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_text(&buffer))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("NAGRIK_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nagrik")
        .join("nagrik.db")
}
