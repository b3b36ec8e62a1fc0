use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::insights::{Insight, InsightBody};
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::{InsightService, KpiService};
use crate::state::AppState;

fn insight_not_found(company_id: &str) -> ApiError {
    ApiError::not_found(format!("No insight found for company {}", company_id))
}

/// GET /api/insights/:company_id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<Insight> {
    auth.ensure_company(&company_id)?;
    let insight = state
        .insights
        .find(&company_id)
        .await?
        .ok_or_else(|| insight_not_found(&company_id))?;
    Ok(ApiResponse::success(insight))
}

/// POST /api/insights/:company_id - store an insight, overwriting any previous one
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
    payload: Result<Json<InsightBody>, JsonRejection>,
) -> ApiResult<Insight> {
    auth.ensure_company(&company_id)?;
    let Json(body) = payload?;
    let insight = state.insights.upsert(&company_id, &body, Utc::now()).await?;
    tracing::info!("Stored insight for company {}", company_id);
    Ok(ApiResponse::success(insight))
}

/// DELETE /api/insights/:company_id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<Value> {
    auth.ensure_company(&company_id)?;
    if !state.insights.delete(&company_id).await? {
        return Err(insight_not_found(&company_id));
    }
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /api/insights/:company_id/generate - ask the analytics service,
/// using the stored company profile
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<Insight> {
    auth.ensure_company(&company_id)?;

    let service = InsightService::new(
        KpiService::new(state.kpis.clone()),
        state.companies.clone(),
        state.insights.clone(),
        state.analytics.clone(),
    );
    let insight = service.generate(&company_id).await?;
    Ok(ApiResponse::success(insight))
}
