use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::kpi::DashboardLayout;
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::{CeoDashboard, KpiService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LayoutsRequest {
    pub layouts: HashMap<String, DashboardLayout>,
}

/// GET /api/dashboard/:company_id - every department at once
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<CeoDashboard> {
    auth.ensure_company(&company_id)?;
    let dashboard = KpiService::new(state.kpis.clone()).dashboard(&company_id).await?;
    Ok(ApiResponse::success(dashboard))
}

/// POST /api/dashboard/:company_id/layouts - empty layout for every department
pub async fn init_layouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<DashboardLayout> {
    auth.ensure_company(&company_id)?;
    let layout = KpiService::new(state.kpis.clone()).init_layouts(&company_id).await?;
    Ok(ApiResponse::created(layout))
}

/// PUT /api/dashboard/:company_id/layouts - `{layouts: {deptKey: layout}}`
pub async fn save_layouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
    payload: Result<Json<LayoutsRequest>, JsonRejection>,
) -> ApiResult<Value> {
    auth.ensure_company(&company_id)?;
    let Json(request) = payload?;
    let saved = KpiService::new(state.kpis.clone())
        .save_layouts(&company_id, request.layouts)
        .await?;
    let saved: Vec<&str> = saved.iter().map(|d| d.key()).collect();
    Ok(ApiResponse::success(json!({ "saved": saved })))
}

/// DELETE /api/dashboard/:company_id/layouts - reset existing layouts to empty
pub async fn reset_layouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<Value> {
    auth.ensure_company(&company_id)?;
    let reset = KpiService::new(state.kpis.clone()).reset_layouts(&company_id).await?;
    Ok(ApiResponse::success(json!({ "reset": reset })))
}
