use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::record::{ChartConfiguration, DashboardLayout, DocumentKey, KpiDocument};
use super::series::SeriesPatch;
use crate::database::DatabaseError;

/// Persistence seam for company KPI documents.
///
/// Every method is a single atomic round-trip against the backing store.
/// Operations on a document that must already exist return `Ok(None)` when
/// it does not, leaving the 404 decision to the caller.
#[async_trait]
pub trait KpiStore: Send + Sync {
    async fn find(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError>;

    /// Insert an empty document unless one exists, then return the stored one.
    async fn find_or_create(&self, key: &DocumentKey, now: DateTime<Utc>) -> Result<KpiDocument, DatabaseError>;

    /// Overwrite `data`, `selectedKPIs` and `lastUpdated`; create if absent.
    async fn replace_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError>;

    /// Push onto `data` and bump `lastUpdated`; create if absent.
    async fn append_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError>;

    /// Returns whether a document was removed.
    async fn delete(&self, key: &DocumentKey) -> Result<bool, DatabaseError>;

    /// Add to `selectedKPIs` unless already present.
    async fn select_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError>;

    async fn deselect_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError>;

    /// Set the layout. With `upsert`, a missing document is created first.
    async fn save_layout(
        &self,
        key: &DocumentKey,
        layout: &DashboardLayout,
        upsert: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<KpiDocument>, DatabaseError>;

    /// Unset the layout.
    async fn clear_layout(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError>;

    async fn set_chart_configurations(
        &self,
        key: &DocumentKey,
        configurations: &[ChartConfiguration],
    ) -> Result<Option<KpiDocument>, DatabaseError>;

    /// Replace the entry with the same `kpiId`, or append a new one.
    async fn upsert_chart_configuration(
        &self,
        key: &DocumentKey,
        configuration: &ChartConfiguration,
    ) -> Result<Option<KpiDocument>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Apply a chart configuration upsert to an in-memory list.
pub fn merge_chart_configuration(configurations: &mut Vec<ChartConfiguration>, configuration: &ChartConfiguration) {
    match configurations.iter_mut().find(|c| c.kpi_id == configuration.kpi_id) {
        Some(existing) => existing.chart_type = configuration.chart_type.clone(),
        None => configurations.push(configuration.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kpi: &str, chart: &str) -> ChartConfiguration {
        ChartConfiguration {
            kpi_id: kpi.to_string(),
            chart_type: chart.to_string(),
        }
    }

    #[test]
    fn chart_configuration_upsert_replaces_in_place() {
        let mut list = vec![config("mrr", "line"), config("arr", "bar")];
        merge_chart_configuration(&mut list, &config("mrr", "area"));
        merge_chart_configuration(&mut list, &config("nrr", "pie"));
        assert_eq!(list, vec![config("mrr", "area"), config("arr", "bar"), config("nrr", "pie")]);
    }
}
