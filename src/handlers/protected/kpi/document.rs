use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Extension;
use serde_json::{json, Value};

use super::{document_key, document_not_found};
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::{ChartView, KpiService};
use crate::state::AppState;

/// GET /api/kpis/:department/:company_id - chart-ready series
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<ChartView> {
    let key = document_key(&auth, &department, &company_id)?;
    let view = KpiService::new(state.kpis.clone()).chart_view(&key).await?;
    Ok(ApiResponse::success(view))
}

/// DELETE /api/kpis/:department/:company_id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let key = document_key(&auth, &department, &company_id)?;
    if !state.kpis.delete(&key).await? {
        return Err(document_not_found(&key));
    }
    tracing::info!("Deleted KPI document {}", key);
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
