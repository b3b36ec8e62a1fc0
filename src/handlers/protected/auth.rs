use std::sync::Arc;

use axum::extract::State;
use axum::Extension;
use serde_json::{json, Value};

use crate::auth::RevokedToken;
use crate::middleware::{ApiResponse, ApiResult, AuthCompany};
use crate::services::CompanyService;
use crate::state::AppState;

/// POST /api/auth/logout - revoke the presented token and mark the company
/// inactive
pub async fn logout(State(state): State<Arc<AppState>>, Extension(auth): Extension<AuthCompany>) -> ApiResult<Value> {
    state
        .revocations
        .revoke(&RevokedToken {
            token_id: auth.token_id,
            company_id: auth.company_id.clone(),
            expires_at: auth.expires_at,
        })
        .await?;

    CompanyService::new(state.companies.clone()).sign_out(&auth.company_id).await?;

    tracing::info!("Revoked token {} for company {}", auth.token_id, auth.company_id);
    Ok(ApiResponse::success(json!({ "message": "Logged out" })))
}
