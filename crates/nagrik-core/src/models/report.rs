//! Draft report model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix for client-generated report ids.
pub const REPORT_ID_PREFIX: &str = "NRK-";

/// A client-generated report identifier.
///
/// Generated ids are `NRK-` followed by a UUID v7 (time-sortable). Any
/// non-empty string is accepted when parsing so ids issued elsewhere
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportId(String);

impl ReportId {
    /// Generate a new unique report id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{REPORT_ID_PREFIX}{}", Uuid::now_v7()))
    }

    /// Parse an id, rejecting empty input and surrounding whitespace.
    /// Ids are kept byte-for-byte, never rewritten.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::InvalidInput("report id cannot be empty".into()));
        }
        if value.trim().len() != value.len() {
            return Err(Error::InvalidInput(format!(
                "report id `{value}` has surrounding whitespace"
            )));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ReportId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReportId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ReportId> for String {
    fn from(id: ReportId) -> Self {
        id.0
    }
}

/// Sync state of a locally stored draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Authored but not queued for delivery
    Draft,
    /// Queued for delivery and not yet confirmed delivered
    #[default]
    PendingSync,
}

impl DraftStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingSync => "pending_sync",
        }
    }

    /// Badge label shown in the queue view
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingSync => "Pending Sync",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(Self::Draft),
            "pending_sync" | "pending" => Ok(Self::PendingSync),
            other => Err(Error::InvalidInput(format!("unknown draft status: {other}"))),
        }
    }
}

/// Civic issue categories offered by the reporting form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    Sanitation,
    Roads,
    Utilities,
    PublicSafety,
    Infrastructure,
    Environment,
}

impl IssueCategory {
    /// Every category, in form order
    pub const ALL: [Self; 6] = [
        Self::Sanitation,
        Self::Roads,
        Self::Utilities,
        Self::PublicSafety,
        Self::Infrastructure,
        Self::Environment,
    ];

    /// Stable slug used in storage and on the wire
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Sanitation => "sanitation",
            Self::Roads => "roads",
            Self::Utilities => "utilities",
            Self::PublicSafety => "public-safety",
            Self::Infrastructure => "infrastructure",
            Self::Environment => "environment",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sanitation => "Sanitation",
            Self::Roads => "Roads & Transportation",
            Self::Utilities => "Utilities",
            Self::PublicSafety => "Public Safety",
            Self::Infrastructure => "Infrastructure",
            Self::Environment => "Environment",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for IssueCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown issue category: {}", s.trim())))
    }
}

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Create a coordinate pair, rejecting out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::Geolocation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::Geolocation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for GeoPoint {
    type Err = Error;

    /// Parse `"lat,lng"` as typed into a manual location field
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| Error::Geolocation(format!("expected `lat,lng`, got `{s}`")))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Geolocation(format!("invalid latitude `{}`", lat.trim())))?;
        let longitude = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Geolocation(format!("invalid longitude `{}`", lng.trim())))?;
        Self::new(latitude, longitude)
    }
}

/// Reference to a locally stored blob (photo or voice note)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A citizen-authored issue report held locally until delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftReport {
    /// Client-generated identifier, immutable once created
    pub id: ReportId,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub location: Option<GeoPoint>,
    pub address: String,
    /// Ordered photo references
    pub photos: Vec<MediaRef>,
    pub voice_note: Option<MediaRef>,
    pub status: DraftStatus,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last local mutation timestamp (Unix ms)
    pub updated_at: i64,
}

impl DraftReport {
    /// Create a draft with the given id, category, and description
    #[must_use]
    pub fn new(id: ReportId, category: IssueCategory, description: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            title: String::new(),
            description: description.into(),
            category,
            location: None,
            address: String::new(),
            photos: Vec::new(),
            voice_note: None,
            status: DraftStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    #[must_use]
    pub fn with_photo(mut self, photo: MediaRef) -> Self {
        self.photos.push(photo);
        self
    }

    #[must_use]
    pub fn with_voice_note(mut self, voice_note: MediaRef) -> Self {
        self.voice_note = Some(voice_note);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: DraftStatus) -> Self {
        self.status = status;
        self
    }

    /// Title for list views, falling back to the category label
    #[must_use]
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            self.category.label()
        } else {
            title
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == DraftStatus::PendingSync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let id1 = ReportId::generate();
        let id2 = ReportId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with(REPORT_ID_PREFIX));
    }

    #[test]
    fn report_id_rejects_blank() {
        assert!(ReportId::parse("   ").is_err());
        assert_eq!(ReportId::parse("R1").unwrap().as_str(), "R1");
    }

    #[test]
    fn report_id_keeps_caller_value_or_rejects_it() {
        assert!(matches!(
            ReportId::parse(" R1"),
            Err(Error::InvalidInput(_))
        ));
        assert!(ReportId::parse("R1\n").is_err());
        assert!(serde_json::from_str::<ReportId>("\" R1\"").is_err());
        assert_eq!(ReportId::parse("R 1").unwrap().as_str(), "R 1");
    }

    #[test]
    fn report_id_deserialize_validates() {
        let parsed: ReportId = serde_json::from_str("\"R7\"").unwrap();
        assert_eq!(parsed.as_str(), "R7");
        assert!(serde_json::from_str::<ReportId>("\"\"").is_err());
    }

    #[test]
    fn draft_status_round_trips_through_storage_form() {
        for status in [DraftStatus::Draft, DraftStatus::PendingSync] {
            assert_eq!(status.as_str().parse::<DraftStatus>().unwrap(), status);
        }
        assert!("synced".parse::<DraftStatus>().is_err());
    }

    #[test]
    fn category_parses_slugs() {
        assert_eq!(
            "public-safety".parse::<IssueCategory>().unwrap(),
            IssueCategory::PublicSafety
        );
        assert_eq!(
            "Public_Safety".parse::<IssueCategory>().unwrap(),
            IssueCategory::PublicSafety
        );
        assert!("potholes".parse::<IssueCategory>().is_err());
    }

    #[test]
    fn category_serializes_as_slug() {
        let json = serde_json::to_string(&IssueCategory::PublicSafety).unwrap();
        assert_eq!(json, "\"public-safety\"");
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(Error::Geolocation(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::NAN),
            Err(Error::Geolocation(_))
        ));
        assert!(GeoPoint::new(28.6139, 77.2090).is_ok());
    }

    #[test]
    fn geo_point_deserialize_validates_range() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"latitude":12.97,"longitude":77.59}"#).unwrap();
        assert!((point.longitude - 77.59).abs() < f64::EPSILON);
        assert!(serde_json::from_str::<GeoPoint>(r#"{"latitude":500,"longitude":0}"#).is_err());
        assert!(
            serde_json::from_str::<GeoPoint>(r#"{"latitude":0,"longitude":-181}"#).is_err()
        );
    }

    #[test]
    fn geo_point_parses_manual_entry() {
        let point: GeoPoint = "28.6139, 77.2090".parse().unwrap();
        assert!((point.latitude - 28.6139).abs() < f64::EPSILON);
        assert!("28.6".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn display_title_falls_back_to_category() {
        let report = DraftReport::new(
            ReportId::parse("R1").unwrap(),
            IssueCategory::Roads,
            "Pothole",
        );
        assert_eq!(report.display_title(), "Roads & Transportation");
        let titled = report.with_title("Big pothole");
        assert_eq!(titled.display_title(), "Big pothole");
    }

    #[test]
    fn new_draft_has_matching_timestamps() {
        let report = DraftReport::new(ReportId::generate(), IssueCategory::Utilities, "Outage");
        assert_eq!(report.status, DraftStatus::Draft);
        assert!(report.created_at > 0);
        assert_eq!(report.created_at, report.updated_at);
    }
}
