use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use chrono::Utc;

use super::{document_key, document_not_found};
use crate::kpi::DashboardLayout;
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::state::AppState;

/// GET /api/kpis/:department/:company_id/layout
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<DashboardLayout> {
    let key = document_key(&auth, &department, &company_id)?;
    let document = state.kpis.find(&key).await?.ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(document.layout_or_default()))
}

/// PUT /api/kpis/:department/:company_id/layout - upsert; `lg` is required
pub async fn put(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
    payload: Result<Json<DashboardLayout>, JsonRejection>,
) -> ApiResult<DashboardLayout> {
    let key = document_key(&auth, &department, &company_id)?;
    let Json(layout) = payload?;

    let document = state
        .kpis
        .save_layout(&key, &layout, true, Utc::now())
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    tracing::info!("Saved layout for {} ({} lg items)", key, layout.lg.len());
    Ok(ApiResponse::success(document.layout_or_default()))
}

/// DELETE /api/kpis/:department/:company_id/layout - unset
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
) -> ApiResult<DashboardLayout> {
    let key = document_key(&auth, &department, &company_id)?;
    let document = state
        .kpis
        .clear_layout(&key)
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    tracing::info!("Reset layout for {}", key);
    Ok(ApiResponse::success(document.layout_or_default()))
}
