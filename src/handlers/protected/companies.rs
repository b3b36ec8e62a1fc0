use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};

use crate::company::{Company, CompanyProfile};
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::CompanyService;
use crate::state::AppState;

/// GET /api/companies/:company_id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
) -> ApiResult<Company> {
    auth.ensure_company(&company_id)?;
    let company = CompanyService::new(state.companies.clone()).profile(&company_id).await?;
    Ok(ApiResponse::success(company))
}

/// PUT /api/companies/:company_id - replace the whole profile
pub async fn put(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthCompany>,
    Path(company_id): Path<String>,
    payload: Result<Json<CompanyProfile>, JsonRejection>,
) -> ApiResult<Company> {
    auth.ensure_company(&company_id)?;
    let Json(profile) = payload?;
    let company = CompanyService::new(state.companies.clone())
        .save_profile(&company_id, &profile)
        .await?;
    Ok(ApiResponse::success(company))
}
