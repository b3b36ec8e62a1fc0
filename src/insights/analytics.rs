use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::model::InsightBody;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid analytics base URL '{0}'")]
    InvalidUrl(String),

    #[error("Analytics request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analytics service answered {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Analytics response could not be decoded: {0}")]
    Decode(String),
}

/// Payload for `POST /generate-insights`.
#[derive(Debug, Clone, Serialize)]
pub struct InsightRequest {
    pub company_data: Value,
    pub kpi_data: Map<String, Value>,
}

/// HTTP client for the external analytics (insight generation) service.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl AnalyticsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalyticsError> {
        let mut base = Url::parse(base_url).map_err(|_| AnalyticsError::InvalidUrl(base_url.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("generate-insights")
            .map_err(|_| AnalyticsError::InvalidUrl(base_url.to_string()))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn generate(&self, request: &InsightRequest) -> Result<InsightBody, AnalyticsError> {
        tracing::debug!("POST {} ({} KPIs)", self.endpoint, request.kpi_data.len());

        let resp = self.http.post(self.endpoint.clone()).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalyticsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AnalyticsError::Decode(e.to_string()))
    }
}
