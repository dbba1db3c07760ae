//! Durable offline draft store shared by the authoring flow and sync engine.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard, OnceCell};

use crate::db::{
    Database, LibSqlReportRepository, LibSqlSettingsRepository, ReportRepository,
    SettingsRepository,
};
use crate::models::{DraftReport, DraftStatus, ReportId, Setting, SettingValue};
use crate::util::unix_millis_now;
use crate::{Error, Result};

/// Where the store keeps its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Path(PathBuf),
    InMemory,
}

/// Keyed persistence for draft reports and settings.
///
/// The underlying database is opened lazily by the first operation (or by
/// [`DraftStore::open`]) and exactly once, even when several tasks race on
/// first access. Clones share the same handle.
#[derive(Clone)]
pub struct DraftStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    location: StoreLocation,
    db: OnceCell<Mutex<Option<Database>>>,
    closed: AtomicBool,
}

impl DraftStore {
    /// A store backed by a database file at `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::with_location(StoreLocation::Path(path.into()))
    }

    /// A store backed by an in-memory database (primarily for tests).
    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::InMemory)
    }

    fn with_location(location: StoreLocation) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                location,
                db: OnceCell::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Whether the underlying database has been opened.
    pub fn is_initialized(&self) -> bool {
        self.inner.db.initialized()
    }

    /// Open the underlying database now instead of on first use.
    pub async fn open(&self) -> Result<()> {
        self.database().await.map(|_| ())
    }

    /// Release the database handle. Later operations fail with a storage error.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        if let Some(cell) = self.inner.db.get() {
            if cell.lock().await.take().is_some() {
                tracing::debug!("Closed draft store");
            }
        }
    }

    async fn handle(&self) -> Result<&Mutex<Option<Database>>> {
        self.inner
            .db
            .get_or_try_init(|| async {
                let db = match &self.inner.location {
                    StoreLocation::Path(path) => {
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        tracing::info!(path = %path.display(), "Opening draft store");
                        Database::open(path).await?
                    }
                    StoreLocation::InMemory => Database::open_in_memory().await?,
                };
                Ok::<_, Error>(Mutex::new(Some(db)))
            })
            .await
    }

    async fn database(&self) -> Result<MappedMutexGuard<'_, Database>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(closed_error());
        }
        let cell = self.handle().await?;
        MutexGuard::try_map(cell.lock().await, Option::as_mut).map_err(|_| closed_error())
    }

    /// Insert or overwrite a draft, always queuing it as `pending_sync`.
    ///
    /// Returns the record as stored.
    pub async fn put(&self, report: &DraftReport) -> Result<DraftReport> {
        let mut queued = report.clone();
        queued.status = DraftStatus::PendingSync;
        queued.updated_at = unix_millis_now();

        let db = self.database().await?;
        let repo = LibSqlReportRepository::new(db.connection());
        repo.upsert(&queued).await?;
        tracing::debug!(report_id = %queued.id, "Queued report for sync");

        repo.get(&queued.id)
            .await?
            .ok_or_else(|| Error::Storage(format!("report {} vanished after write", queued.id)))
    }

    /// Fetch one draft by id.
    pub async fn get(&self, id: &ReportId) -> Result<Option<DraftReport>> {
        let db = self.database().await?;
        LibSqlReportRepository::new(db.connection()).get(id).await
    }

    /// Every stored draft. Callers must not rely on the order.
    pub async fn get_all(&self) -> Result<Vec<DraftReport>> {
        let db = self.database().await?;
        LibSqlReportRepository::new(db.connection()).list().await
    }

    /// Drafts with the given status.
    pub async fn get_all_by_status(&self, status: DraftStatus) -> Result<Vec<DraftReport>> {
        let db = self.database().await?;
        LibSqlReportRepository::new(db.connection())
            .list_by_status(status)
            .await
    }

    /// Remove a draft. Deleting a missing id is not an error; the return
    /// value tells whether a record was actually removed.
    pub async fn delete(&self, id: &ReportId) -> Result<bool> {
        let db = self.database().await?;
        LibSqlReportRepository::new(db.connection()).delete(id).await
    }

    /// Number of stored drafts.
    pub async fn count(&self) -> Result<usize> {
        let db = self.database().await?;
        LibSqlReportRepository::new(db.connection()).count().await
    }

    /// Upsert a preference value.
    pub async fn put_setting(&self, key: &str, value: &SettingValue) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInput("setting key cannot be empty".into()));
        }
        if let SettingValue::Float(number) = value {
            if !number.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "setting {key} must be a finite number"
                )));
            }
        }
        let db = self.database().await?;
        LibSqlSettingsRepository::new(db.connection())
            .put(key, value)
            .await
    }

    /// Look up a preference value; `None` when absent.
    pub async fn get_setting(&self, key: &str) -> Result<Option<SettingValue>> {
        let db = self.database().await?;
        LibSqlSettingsRepository::new(db.connection())
            .get(key.trim())
            .await
    }

    /// Every stored preference, ordered by key.
    pub async fn list_settings(&self) -> Result<Vec<Setting>> {
        let db = self.database().await?;
        LibSqlSettingsRepository::new(db.connection()).list().await
    }
}

fn closed_error() -> Error {
    Error::Storage("draft store is closed".to_string())
}
