use axum::{
    extract::Path,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::kpi::Department;

/// GET /api/templates/:department - CSV header row for uploads
pub async fn csv_template(Path(department): Path<String>) -> Result<Response, ApiError> {
    let department: Department = department.parse()?;
    let disposition = format!("attachment; filename=\"{}-kpi-template.csv\"", department.slug());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        department.csv_template(),
    )
        .into_response())
}
