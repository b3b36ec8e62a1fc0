//! In-process stores used when no `DATABASE_URL` is configured, and by the
//! test suite. Each operation holds the write lock for its whole duration,
//! which gives the same per-call atomicity as the SQL statements.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use crate::auth::{RevocationStore, RevokedToken};
use crate::company::{Company, CompanyProfile, CompanyStore};
use crate::insights::{Insight, InsightBody, InsightStore};
use crate::kpi::store::merge_chart_configuration;
use crate::kpi::{ChartConfiguration, DashboardLayout, DocumentKey, KpiDocument, KpiStore, SeriesPatch};

#[derive(Debug, Default)]
pub struct MemoryKpiStore {
    documents: RwLock<HashMap<DocumentKey, KpiDocument>>,
}

impl MemoryKpiStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F>(&self, key: &DocumentKey, apply: F) -> Option<KpiDocument>
    where
        F: FnOnce(&mut KpiDocument) + Send,
    {
        let mut documents = self.documents.write().await;
        documents.get_mut(key).map(|document| {
            apply(document);
            document.clone()
        })
    }
}

#[async_trait]
impl KpiStore for MemoryKpiStore {
    async fn find(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn find_or_create(&self, key: &DocumentKey, now: DateTime<Utc>) -> Result<KpiDocument, DatabaseError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .entry(key.clone())
            .or_insert_with(|| KpiDocument::empty(key, now));
        Ok(document.clone())
    }

    async fn replace_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError> {
        let key = DocumentKey::new(company_id, patch.department);
        let mut documents = self.documents.write().await;
        let document = documents
            .entry(key.clone())
            .or_insert_with(|| KpiDocument::empty(&key, patch.updated_at));
        document.selected_kpis = patch.selected_kpis;
        document.data = patch.records;
        document.last_updated = patch.updated_at;
        Ok(document.clone())
    }

    async fn append_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError> {
        let key = DocumentKey::new(company_id, patch.department);
        let mut documents = self.documents.write().await;
        let document = documents
            .entry(key.clone())
            .or_insert_with(|| KpiDocument::empty(&key, patch.updated_at));
        document.data.extend(patch.records);
        document.last_updated = patch.updated_at;
        Ok(document.clone())
    }

    async fn delete(&self, key: &DocumentKey) -> Result<bool, DatabaseError> {
        Ok(self.documents.write().await.remove(key).is_some())
    }

    async fn select_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self
            .update(key, |document| {
                if !document.selected_kpis.iter().any(|k| k == kpi_id) {
                    document.selected_kpis.push(kpi_id.to_string());
                }
            })
            .await)
    }

    async fn deselect_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self
            .update(key, |document| document.selected_kpis.retain(|k| k != kpi_id))
            .await)
    }

    async fn save_layout(
        &self,
        key: &DocumentKey,
        layout: &DashboardLayout,
        upsert: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        if upsert {
            let mut documents = self.documents.write().await;
            let document = documents
                .entry(key.clone())
                .or_insert_with(|| KpiDocument::empty(key, now));
            document.dashboard_layout = Some(layout.clone());
            return Ok(Some(document.clone()));
        }
        Ok(self
            .update(key, |document| document.dashboard_layout = Some(layout.clone()))
            .await)
    }

    async fn clear_layout(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self.update(key, |document| document.dashboard_layout = None).await)
    }

    async fn set_chart_configurations(
        &self,
        key: &DocumentKey,
        configurations: &[ChartConfiguration],
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self
            .update(key, |document| document.chart_configurations = configurations.to_vec())
            .await)
    }

    async fn upsert_chart_configuration(
        &self,
        key: &DocumentKey,
        configuration: &ChartConfiguration,
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        Ok(self
            .update(key, |document| {
                merge_chart_configuration(&mut document.chart_configurations, configuration)
            })
            .await)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashMap<Uuid, RevokedToken>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &RevokedToken) -> Result<(), DatabaseError> {
        self.revoked
            .write()
            .await
            .entry(token.token_id)
            .or_insert_with(|| token.clone());
        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid, now: DateTime<Utc>) -> Result<bool, DatabaseError> {
        Ok(self
            .revoked
            .read()
            .await
            .get(&token_id)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, entry| entry.expires_at > now);
        Ok((before - revoked.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryInsightStore {
    insights: RwLock<HashMap<String, Insight>>,
}

impl MemoryInsightStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    async fn find(&self, company_id: &str) -> Result<Option<Insight>, DatabaseError> {
        Ok(self.insights.read().await.get(company_id).cloned())
    }

    async fn upsert(&self, company_id: &str, body: &InsightBody, now: DateTime<Utc>) -> Result<Insight, DatabaseError> {
        let mut insights = self.insights.write().await;
        let insight = insights
            .entry(company_id.to_string())
            .and_modify(|existing| {
                existing.body = body.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| Insight {
                company_id: company_id.to_string(),
                body: body.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(insight.clone())
    }

    async fn delete(&self, company_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.insights.write().await.remove(company_id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCompanyStore {
    companies: RwLock<HashMap<String, Company>>,
}

impl MemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for MemoryCompanyStore {
    async fn find(&self, company_id: &str) -> Result<Option<Company>, DatabaseError> {
        Ok(self.companies.read().await.get(company_id).cloned())
    }

    async fn save_profile(
        &self,
        company_id: &str,
        profile: &CompanyProfile,
        now: DateTime<Utc>,
    ) -> Result<Company, DatabaseError> {
        let mut companies = self.companies.write().await;
        let company = companies
            .entry(company_id.to_string())
            .and_modify(|existing| {
                existing.profile = profile.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| Company {
                company_id: company_id.to_string(),
                profile: profile.clone(),
                is_active: false,
                last_login: None,
                last_logout: None,
                created_at: now,
                updated_at: now,
            });
        Ok(company.clone())
    }

    async fn set_active(
        &self,
        company_id: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, DatabaseError> {
        let mut companies = self.companies.write().await;
        Ok(companies.get_mut(company_id).map(|company| {
            company.is_active = active;
            if active {
                company.last_login = Some(now);
            } else {
                company.last_logout = Some(now);
            }
            company.updated_at = now;
            company.clone()
        }))
    }
}
