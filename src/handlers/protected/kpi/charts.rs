use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use super::{document_key, document_not_found};
use crate::error::ApiError;
use crate::kpi::ChartConfiguration;
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTypeRequest {
    pub chart_type: String,
}

/// GET /api/kpis/:department/:company_id/chart-configurations
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<Vec<ChartConfiguration>> {
    let key = document_key(&auth, &department, &company_id)?;
    let document = state.kpis.find(&key).await?.ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(document.chart_configurations))
}

/// PUT /api/kpis/:department/:company_id/chart-configurations - replace all
///
/// Body is an array; every entry needs a non-empty `kpiId` and `chartType`.
pub async fn replace(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<ChartConfiguration>> {
    let key = document_key(&auth, &department, &company_id)?;
    let Json(body) = payload?;
    let configurations = parse_configurations(body)?;

    let document = state
        .kpis
        .set_chart_configurations(&key, &configurations)
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    tracing::info!("Saved {} chart configurations for {}", configurations.len(), key);
    Ok(ApiResponse::success(document.chart_configurations))
}

/// PUT /api/kpis/:department/:company_id/chart-configurations/:kpi_id
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id, kpi_id)): Path<(String, String, String)>,
    payload: Result<Json<ChartTypeRequest>, JsonRejection>,
) -> ApiResult<Vec<ChartConfiguration>> {
    let key = document_key(&auth, &department, &company_id)?;
    let Json(request) = payload?;
    if request.chart_type.trim().is_empty() {
        return Err(ApiError::field_error("chartType", "chartType is required"));
    }

    let configuration = ChartConfiguration {
        kpi_id,
        chart_type: request.chart_type,
    };
    let document = state
        .kpis
        .upsert_chart_configuration(&key, &configuration)
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(document.chart_configurations))
}

/// DELETE /api/kpis/:department/:company_id/chart-configurations - reset to empty
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<Vec<ChartConfiguration>> {
    let key = document_key(&auth, &department, &company_id)?;
    let document = state
        .kpis
        .set_chart_configurations(&key, &[])
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(document.chart_configurations))
}

fn parse_configurations(body: Value) -> Result<Vec<ChartConfiguration>, ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::bad_request("Chart configurations must be an array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let field = |name: &str| {
                item.get(name)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            };
            match (field("kpiId"), field("chartType")) {
                (Some(kpi_id), Some(chart_type)) => Ok(ChartConfiguration { kpi_id, chart_type }),
                _ => Err(ApiError::field_error(
                    &format!("[{index}]"),
                    "Each configuration must have kpiId and chartType",
                )),
            }
        })
        .collect()
}
