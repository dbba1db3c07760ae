use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use nagrik_core::sync::IDEMPOTENCY_KEY_HEADER;
use nagrik_core::{DraftReport, ReportId};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{authorize, Caller};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::rate_limit::{RateLimitMetricsSnapshot, SubmissionRateLimiter};
use crate::registry::{ReceivedReport, ReportRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    registry: ReportRegistry,
    rate_limiter: SubmissionRateLimiter,
}

impl AppState {
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            registry: ReportRegistry::new(),
            rate_limiter: SubmissionRateLimiter::from_config(config.as_ref()),
            config,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let report_routes = Router::new()
        .route("/reports", post(submit_report))
        .route("/reports/{id}", get(get_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/v1", report_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    reports_received: usize,
    rate_limit: RateLimitMetricsSnapshot,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        reports_received: state.registry.count().await,
        rate_limit: state.rate_limiter.metrics_snapshot(),
    })
}

async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = authorize(request.headers(), state.config.api_token.as_deref())?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    id: ReportId,
    duplicate: bool,
    received_at: i64,
}

async fn submit_report(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    Json(report): Json<DraftReport>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    check_idempotency_key(&headers, &report.id)?;
    // Redeliveries of a known id are acknowledged without spending budget.
    if !state.registry.contains(&report.id).await {
        state.rate_limiter.check(&caller).await?;
    }

    let id = report.id.clone();
    let category = report.category.slug();
    let receipt = state.registry.record(report).await;
    let status = if receipt.is_duplicate() {
        tracing::info!(report = %id, "Duplicate report delivery acknowledged");
        StatusCode::OK
    } else {
        tracing::info!(report = %id, category, "Report received");
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(SubmitResponse {
            id,
            duplicate: receipt.is_duplicate(),
            received_at: receipt.received_at(),
        }),
    ))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReceivedReport>, AppError> {
    let id = ReportId::parse(id).map_err(|error| AppError::bad_request(error.to_string()))?;
    state
        .registry
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("report {id}")))
}

/// The idempotency key is optional, but when sent it must name the body's id.
fn check_idempotency_key(headers: &HeaderMap, id: &ReportId) -> Result<(), AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(());
    };
    let key = value
        .to_str()
        .map_err(|_| AppError::bad_request("Idempotency-Key header is not valid UTF-8"))?;
    if key.trim() == id.as_str() {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Idempotency-Key does not match the report id",
        ))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn idempotency_key_must_match_report_id() {
        let id = ReportId::parse("R1").unwrap();
        assert!(check_idempotency_key(&HeaderMap::new(), &id).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static("R1"));
        assert!(check_idempotency_key(&headers, &id).is_ok());

        headers.insert(IDEMPOTENCY_KEY_HEADER, HeaderValue::from_static("R2"));
        assert!(matches!(
            check_idempotency_key(&headers, &id),
            Err(AppError::BadRequest(_))
        ));
    }
}
