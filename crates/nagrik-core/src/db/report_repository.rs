//! Draft report repository implementation

use crate::error::{Error, Result};
use crate::models::{DraftReport, DraftStatus, GeoPoint, MediaRef, ReportId};
use libsql::{Connection, Row, Value};

const REPORT_COLUMNS: &str = "id, title, description, category, latitude, longitude, address, \
                              photos, voice_note, status, created_at, updated_at";

/// Trait for draft report storage operations (async)
#[allow(async_fn_in_trait)]
pub trait ReportRepository {
    /// Insert or overwrite the record keyed by `report.id`
    async fn upsert(&self, report: &DraftReport) -> Result<()>;

    /// Get a report by ID
    async fn get(&self, id: &ReportId) -> Result<Option<DraftReport>>;

    /// List every stored report, newest first
    async fn list(&self) -> Result<Vec<DraftReport>>;

    /// List reports with the given status, oldest first
    async fn list_by_status(&self, status: DraftStatus) -> Result<Vec<DraftReport>>;

    /// Delete a report; returns whether a row was removed
    async fn delete(&self, id: &ReportId) -> Result<bool>;

    /// Count stored reports
    async fn count(&self) -> Result<usize>;
}

/// libSQL implementation of `ReportRepository`
pub struct LibSqlReportRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlReportRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a report from a database row
    fn parse_report(row: &Row) -> Result<DraftReport> {
        let id: String = row.get(0)?;
        let category: String = row.get(3)?;
        let status: String = row.get(9)?;
        let photos: String = row.get(7)?;

        let location = match (optional_real(row, 4)?, optional_real(row, 5)?) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Ok(DraftReport {
            id: ReportId::parse(id)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: category
                .parse()
                .map_err(|_| Error::Storage(format!("corrupt category column: {category}")))?,
            location,
            address: row.get(6)?,
            photos: serde_json::from_str::<Vec<String>>(&photos)?
                .into_iter()
                .map(MediaRef::new)
                .collect(),
            voice_note: optional_text(row, 8)?.map(MediaRef::new),
            status: status
                .parse()
                .map_err(|_| Error::Storage(format!("corrupt status column: {status}")))?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    async fn query_reports(&self, sql: &str, params: Vec<Value>) -> Result<Vec<DraftReport>> {
        let mut rows = self.conn.query(sql, params).await?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().await? {
            reports.push(Self::parse_report(&row)?);
        }
        Ok(reports)
    }
}

impl ReportRepository for LibSqlReportRepository<'_> {
    async fn upsert(&self, report: &DraftReport) -> Result<()> {
        let photos = serde_json::to_string(
            &report
                .photos
                .iter()
                .map(MediaRef::as_str)
                .collect::<Vec<_>>(),
        )?;
        let latitude = report
            .location
            .map_or(Value::Null, |point| Value::Real(point.latitude));
        let longitude = report
            .location
            .map_or(Value::Null, |point| Value::Real(point.longitude));
        let voice_note = report
            .voice_note
            .as_ref()
            .map_or(Value::Null, |note| Value::Text(note.as_str().to_string()));

        // created_at is immutable once a row exists
        self.conn
            .execute(
                "INSERT INTO reports (id, title, description, category, latitude, longitude,
                                      address, photos, voice_note, status, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    category = excluded.category,
                    latitude = excluded.latitude,
                    longitude = excluded.longitude,
                    address = excluded.address,
                    photos = excluded.photos,
                    voice_note = excluded.voice_note,
                    status = excluded.status,
                    updated_at = excluded.updated_at",
                vec![
                    Value::Text(report.id.as_str().to_string()),
                    Value::Text(report.title.clone()),
                    Value::Text(report.description.clone()),
                    Value::Text(report.category.slug().to_string()),
                    latitude,
                    longitude,
                    Value::Text(report.address.clone()),
                    Value::Text(photos),
                    voice_note,
                    Value::Text(report.status.as_str().to_string()),
                    Value::Integer(report.created_at),
                    Value::Integer(report.updated_at),
                ],
            )
            .await?;

        Ok(())
    }

    async fn get(&self, id: &ReportId) -> Result<Option<DraftReport>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?");
        let mut reports = self
            .query_reports(&sql, vec![Value::Text(id.as_str().to_string())])
            .await?;
        Ok(reports.pop())
    }

    async fn list(&self) -> Result<Vec<DraftReport>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC");
        self.query_reports(&sql, Vec::new()).await
    }

    async fn list_by_status(&self, status: DraftStatus) -> Result<Vec<DraftReport>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE status = ? ORDER BY created_at ASC"
        );
        self.query_reports(&sql, vec![Value::Text(status.as_str().to_string())])
            .await
    }

    async fn delete(&self, id: &ReportId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM reports WHERE id = ?", [id.as_str()])
            .await?;
        Ok(removed > 0)
    }

    async fn count(&self) -> Result<usize> {
        let mut rows = self.conn.query("SELECT COUNT(*) FROM reports", ()).await?;
        let count = if let Some(row) = rows.next().await? {
            row.get::<i64>(0)?
        } else {
            0
        };
        usize::try_from(count).map_err(|_| Error::Storage(format!("invalid row count {count}")))
    }
}

#[allow(clippy::cast_precision_loss)] // coordinates written as INTEGER by external tools
fn optional_real(row: &Row, idx: i32) -> Result<Option<f64>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Real(value) => Ok(Some(value)),
        Value::Integer(value) => Ok(Some(value as f64)),
        other => Err(Error::Storage(format!(
            "expected REAL in column {idx}, found {other:?}"
        ))),
    }
}

fn optional_text(row: &Row, idx: i32) -> Result<Option<String>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Text(value) => Ok(Some(value)),
        other => Err(Error::Storage(format!(
            "expected TEXT in column {idx}, found {other:?}"
        ))),
    }
}
