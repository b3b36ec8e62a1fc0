use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::{document_key, document_not_found};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub kpi_id: String,
}

#[derive(Debug, Serialize)]
pub struct Selection {
    #[serde(rename = "selectedKPIs")]
    pub selected_kpis: Vec<String>,
}

/// PUT /api/kpis/:department/:company_id/select - add to selection
pub async fn select(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
    payload: Result<Json<SelectRequest>, JsonRejection>,
) -> ApiResult<Selection> {
    let key = document_key(&auth, &department, &company_id)?;
    let Json(request) = payload?;

    if !key.department.allows(&request.kpi_id) {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "kpiId".to_string(),
            format!("Not a {} KPI", key.department.display_name()),
        );
        return Err(ApiError::unprocessable_entity(
            format!("Unknown KPI '{}'", request.kpi_id),
            field_errors,
        ));
    }

    let document = state
        .kpis
        .select_kpi(&key, &request.kpi_id)
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(Selection {
        selected_kpis: document.selected_kpis,
    }))
}

/// DELETE /api/kpis/:department/:company_id/select/:kpi_id
pub async fn deselect(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id, kpi_id)): Path<(String, String, String)>,
) -> ApiResult<Selection> {
    let key = document_key(&auth, &department, &company_id)?;
    let document = state
        .kpis
        .deselect_kpi(&key, &kpi_id)
        .await?
        .ok_or_else(|| document_not_found(&key))?;
    Ok(ApiResponse::success(Selection {
        selected_kpis: document.selected_kpis,
    }))
}
