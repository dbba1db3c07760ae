//! Delivery of draft reports to the remote reporting endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::DraftReport;
use crate::util::{endpoint_base_url, error_excerpt, normalize_text};

/// Header carrying the report id so the endpoint can deduplicate retries.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Reporting endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("Reporting endpoint rejected the report: {message} ({status})")]
    Rejected { status: u16, message: String },
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid delivery configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(error: reqwest::Error) -> Self {
        Self::Unreachable(error.to_string())
    }
}

/// Acknowledgement from the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// The endpoint had already received this report id.
    pub duplicate: bool,
}

/// Accepts one draft report and reports success or failure.
pub trait ReportDelivery: Send + Sync + 'static {
    fn deliver(
        &self,
        report: &DraftReport,
    ) -> impl Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send;
}

/// REST/JSON delivery to `POST {api_base_url}/v1/reports`.
#[derive(Clone)]
pub struct HttpReportDelivery {
    reports_url: String,
    health_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpReportDelivery {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpReportDelivery")
            .field("reports_url", &self.reports_url)
            .field("health_url", &self.health_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl HttpReportDelivery {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let base = normalize_base_url(api_base_url.into())?;
        Ok(Self {
            reports_url: format!("{base}/v1/reports"),
            health_url: format!("{base}/healthz"),
            bearer_token: None,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Build from resolved client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, DeliveryError> {
        let base = config.api_base_url.clone().ok_or_else(|| {
            DeliveryError::InvalidConfiguration("no reporting endpoint configured".to_string())
        })?;
        let delivery = Self::new(base, config.delivery_timeout)?;
        Ok(match config.api_token.clone() {
            Some(token) => delivery.with_bearer_token(token),
            None => delivery,
        })
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token: String = token.into();
        self.bearer_token = normalize_text(&token);
        self
    }

    pub fn reports_url(&self) -> &str {
        &self.reports_url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Whether the endpoint's health check answers with a success status.
    pub async fn probe(&self) -> bool {
        match self.client.get(&self.health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!("Reachability probe failed: {error}");
                false
            }
        }
    }
}

impl ReportDelivery for HttpReportDelivery {
    async fn deliver(&self, report: &DraftReport) -> Result<DeliveryReceipt, DeliveryError> {
        let response = self
            .authorized(self.client.post(&self.reports_url))
            .header(IDEMPOTENCY_KEY_HEADER, report.id.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        Ok(DeliveryReceipt {
            duplicate: status != StatusCode::CREATED,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return error_excerpt(&message);
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

fn normalize_base_url(raw: String) -> Result<String, DeliveryError> {
    let base = normalize_text(&raw).ok_or_else(|| {
        DeliveryError::InvalidConfiguration("endpoint must not be empty".to_string())
    })?;
    endpoint_base_url(&base).ok_or_else(|| {
        DeliveryError::InvalidConfiguration(
            "endpoint must include http:// or https://".to_string(),
        )
    })
}
