//! Report authoring: validates a form and either delivers it directly or
//! queues it in the draft store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::connectivity::Connectivity;
use crate::models::{DraftReport, GeoPoint, IssueCategory, MediaRef, ReportId};
use crate::sync::{ReportDelivery, SyncEngine};
use crate::util::normalize_text_option;
use crate::{Error, Result};

/// User input for a new report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportForm {
    pub category: Option<IssueCategory>,
    pub title: Option<String>,
    pub description: String,
    pub location: Option<GeoPoint>,
    pub address: Option<String>,
    pub photos: Vec<PathBuf>,
    pub voice_note: Option<PathBuf>,
}

impl ReportForm {
    /// Validate the form and build a fresh draft from it.
    pub fn into_draft(self) -> Result<DraftReport> {
        let category = self
            .category
            .ok_or_else(|| Error::InvalidInput("category is required".into()))?;
        let description = normalize_text_option(Some(self.description))
            .ok_or_else(|| Error::InvalidInput("description is required".into()))?;

        let title =
            normalize_text_option(self.title).unwrap_or_else(|| category.label().to_string());
        let mut report =
            DraftReport::new(ReportId::generate(), category, description).with_title(title);

        if let Some(location) = self.location {
            report = report.with_location(location);
        }
        if let Some(address) = normalize_text_option(self.address) {
            report = report.with_address(address);
        }
        for photo in &self.photos {
            report = report.with_photo(media_ref(photo)?);
        }
        if let Some(voice_note) = &self.voice_note {
            report = report.with_voice_note(media_ref(voice_note)?);
        }
        Ok(report)
    }
}

fn media_ref(path: &Path) -> Result<MediaRef> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(MediaRef::new(path.display().to_string())),
        Ok(_) => Err(Error::MediaAccess(format!("{} is not a file", path.display()))),
        Err(error) => Err(Error::MediaAccess(format!("{}: {error}", path.display()))),
    }
}

/// Where a submitted report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted by the remote endpoint.
    Delivered(ReportId),
    /// Stored locally as `pending_sync`.
    Queued(ReportId),
}

impl Submission {
    pub const fn id(&self) -> &ReportId {
        match self {
            Self::Delivered(id) | Self::Queued(id) => id,
        }
    }
}

pub struct ReportComposer<D> {
    engine: Arc<SyncEngine<D>>,
}

impl<D: ReportDelivery> ReportComposer<D> {
    pub const fn new(engine: Arc<SyncEngine<D>>) -> Self {
        Self { engine }
    }

    /// Submit a form. Online submissions are delivered directly and fall
    /// back to the queue when delivery fails; offline ones are queued.
    pub async fn submit(
        &self,
        form: ReportForm,
        connectivity: Connectivity,
    ) -> Result<Submission> {
        let report = form.into_draft()?;

        if connectivity.is_online() {
            match self.engine.deliver(&report).await {
                Ok(_) => {
                    tracing::info!(report_id = %report.id, "Report submitted");
                    return Ok(Submission::Delivered(report.id));
                }
                Err(error) => {
                    tracing::warn!(
                        report_id = %report.id,
                        "Direct delivery failed; queuing report: {error}"
                    );
                }
            }
        }

        let stored = self.engine.store().put(&report).await?;
        tracing::info!(report_id = %stored.id, "Report saved offline");
        Ok(Submission::Queued(stored.id))
    }
}
