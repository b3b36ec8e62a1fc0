// /api/kpis/:department/:company_id - one generic component for all departments
pub mod charts;
pub mod document;
pub mod layout;
pub mod select;
pub mod series;

use crate::error::ApiError;
use crate::kpi::{Department, DocumentKey};
use crate::middleware::AuthCompany;

/// Resolve the path into a document key the caller may access.
pub(crate) fn document_key(auth: &AuthCompany, department: &str, company_id: &str) -> Result<DocumentKey, ApiError> {
    let department: Department = department.parse()?;
    auth.ensure_company(company_id)?;
    Ok(DocumentKey::new(company_id, department))
}

pub(crate) fn document_not_found(key: &DocumentKey) -> ApiError {
    ApiError::not_found(format!(
        "No {} KPI data found for company {}",
        key.department.display_name(),
        key.company_id
    ))
}
