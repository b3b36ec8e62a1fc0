use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service metadata
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "KPI Dashboard API",
            "version": version,
            "description": "Per-company department KPI time series, CSV ingest and dashboard layouts",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "templates": "/api/templates/:department (public)",
                "companies": "/api/companies/:company_id (protected)",
                "kpis": "/api/kpis/:department/:company_id[/series|/layout|/select|/chart-configurations] (protected)",
                "dashboard": "/api/dashboard/:company_id[/layouts] (protected)",
                "insights": "/api/insights/:company_id[/generate] (protected)",
                "auth": "/api/auth/logout (protected)",
            }
        }
    }))
}

/// GET /health - liveness plus store connectivity
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.kpis.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
