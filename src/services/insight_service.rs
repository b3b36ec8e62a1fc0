use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use super::kpi_service::{KpiService, KpiServiceError};
use crate::company::CompanyStore;
use crate::database::DatabaseError;
use crate::insights::{kpi_snapshot, AnalyticsClient, AnalyticsError, Insight, InsightBody, InsightRequest, InsightStore};

#[derive(Debug, Error)]
pub enum InsightServiceError {
    #[error("Company not found")]
    CompanyNotFound(String),

    #[error(transparent)]
    Kpi(#[from] KpiServiceError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

/// Insight generation: load the company profile, snapshot its KPIs, ask the
/// analytics service, store the answer.
pub struct InsightService {
    kpis: KpiService,
    companies: Arc<dyn CompanyStore>,
    store: Arc<dyn InsightStore>,
    analytics: AnalyticsClient,
}

impl InsightService {
    pub fn new(
        kpis: KpiService,
        companies: Arc<dyn CompanyStore>,
        store: Arc<dyn InsightStore>,
        analytics: AnalyticsClient,
    ) -> Self {
        Self {
            kpis,
            companies,
            store,
            analytics,
        }
    }

    /// Build the request sent to the analytics service.
    pub async fn build_request(&self, company_id: &str) -> Result<InsightRequest, InsightServiceError> {
        let company = self
            .companies
            .find(company_id)
            .await?
            .ok_or_else(|| InsightServiceError::CompanyNotFound(company_id.to_string()))?;
        let documents = self.kpis.all_departments(company_id).await?;
        let kpi_data = kpi_snapshot(documents.iter().filter_map(|(_, document)| document.as_ref()));
        Ok(InsightRequest {
            company_data: company.profile.insight_payload(),
            kpi_data,
        })
    }

    pub async fn generate(&self, company_id: &str) -> Result<Insight, InsightServiceError> {
        let request = self.build_request(company_id).await?;
        info!(
            "Requesting insights for company {} ({} KPIs)",
            company_id,
            request.kpi_data.len()
        );

        let body: InsightBody = self.analytics.generate(&request).await?;
        let insight = self.store.upsert(company_id, &body, Utc::now()).await?;
        info!("Stored generated insight for company {}", company_id);
        Ok(insight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::company::model::sample_profile;
    use crate::database::{MemoryCompanyStore, MemoryInsightStore, MemoryKpiStore};

    fn service(companies: Arc<MemoryCompanyStore>) -> InsightService {
        // nothing listens on the discard port; these tests never reach it
        let analytics = AnalyticsClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        InsightService::new(
            KpiService::new(Arc::new(MemoryKpiStore::new())),
            companies,
            Arc::new(MemoryInsightStore::new()),
            analytics,
        )
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let err = service(Arc::new(MemoryCompanyStore::new()))
            .generate("ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, InsightServiceError::CompanyNotFound(ref id) if id == "ghost"));
        assert_eq!(err.to_string(), "Company not found");
    }

    #[tokio::test]
    async fn request_carries_the_stored_profile() {
        let companies = Arc::new(MemoryCompanyStore::new());
        companies
            .save_profile("acme", &sample_profile("Acme"), Utc::now())
            .await
            .unwrap();
        let request = service(companies).build_request("acme").await.unwrap();
        assert_eq!(request.company_data["name"], "Acme");
        assert_eq!(request.company_data["market_cagr"], 14.5);
        assert!(request.kpi_data.is_empty());
    }
}
