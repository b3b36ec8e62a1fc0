use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::document_key;
use crate::error::ApiError;
use crate::kpi::{parse_inline_csv, MergeMode};
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::{IngestSummary, KpiService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesUpload {
    pub file_data: String,
}

/// PUT /api/kpis/:department/:company_id/series - replace stored data
pub async fn replace(
    state: State<Arc<AppState>>,
    auth: Extension<AuthCompany>,
    path: Path<(String, String)>,
    payload: Result<Json<SeriesUpload>, JsonRejection>,
) -> ApiResult<IngestSummary> {
    ingest(state, auth, path, payload, MergeMode::Replace).await
}

/// POST /api/kpis/:department/:company_id/series - append to stored data
pub async fn append(
    state: State<Arc<AppState>>,
    auth: Extension<AuthCompany>,
    path: Path<(String, String)>,
    payload: Result<Json<SeriesUpload>, JsonRejection>,
) -> ApiResult<IngestSummary> {
    ingest(state, auth, path, payload, MergeMode::Append).await
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path((department, company_id)): Path<(String, String)>,
    payload: Result<Json<SeriesUpload>, JsonRejection>,
    mode: MergeMode,
) -> ApiResult<IngestSummary> {
    let key = document_key(&auth, &department, &company_id)?;
    let Json(upload) = payload?;
    if upload.file_data.trim().is_empty() {
        return Err(ApiError::field_error("fileData", "No CSV data provided"));
    }

    let entries = parse_inline_csv(&upload.file_data)?;
    let summary = KpiService::new(state.kpis.clone())
        .ingest(&key.company_id, key.department, entries, mode)
        .await?;
    Ok(ApiResponse::success(summary))
}
