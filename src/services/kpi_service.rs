use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::DatabaseError;
use crate::kpi::{
    format_for_charts, ChartSeries, DashboardLayout, Department, DocumentKey, KpiDocument, KpiEntry, KpiStore,
    MergeMode, SeriesPatch,
};

#[derive(Debug, Error)]
pub enum KpiServiceError {
    #[error("No valid data rows found in CSV")]
    NoValidRows,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Chart-ready view of one department document.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    #[serde(rename = "selectedKPIs")]
    pub selected_kpis: Vec<String>,
    pub kpis: ChartSeries,
}

impl From<&KpiDocument> for ChartView {
    fn from(document: &KpiDocument) -> Self {
        Self {
            selected_kpis: document.selected_kpis.clone(),
            kpis: format_for_charts(&document.data),
        }
    }
}

/// Outcome of one ingest batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub company_id: String,
    pub department: Department,
    pub mode: &'static str,
    pub rows: usize,
    pub total_records: usize,
    #[serde(rename = "selectedKPIs")]
    pub selected_kpis: Vec<String>,
    pub last_updated: chrono::DateTime<Utc>,
}

impl IngestSummary {
    pub fn new(document: &KpiDocument, rows: usize, mode: MergeMode) -> Self {
        Self {
            company_id: document.company_id.clone(),
            department: document.department,
            mode: mode.as_str(),
            rows,
            total_records: document.data.len(),
            selected_kpis: document.selected_kpis.clone(),
            last_updated: document.last_updated,
        }
    }
}

/// All eight departments keyed by department key.
#[derive(Debug, Clone, Serialize)]
pub struct CeoDashboard {
    pub kpis: BTreeMap<&'static str, ChartSeries>,
    #[serde(rename = "selectedKPIs")]
    pub selected_kpis: BTreeMap<&'static str, Vec<String>>,
    pub layouts: BTreeMap<&'static str, DashboardLayout>,
}

/// KPI document operations on top of a [`KpiStore`]
#[derive(Clone)]
pub struct KpiService {
    store: Arc<dyn KpiStore>,
}

impl KpiService {
    pub fn new(store: Arc<dyn KpiStore>) -> Self {
        Self { store }
    }

    /// Merge a normalised batch into the company's department document.
    pub async fn ingest(
        &self,
        company_id: &str,
        department: Department,
        entries: Vec<KpiEntry>,
        mode: MergeMode,
    ) -> Result<IngestSummary, KpiServiceError> {
        if entries.is_empty() {
            return Err(KpiServiceError::NoValidRows);
        }

        let rows = entries.len();
        let patch = SeriesPatch::new(department, entries, Utc::now());
        let document = match mode {
            MergeMode::Replace => self.store.replace_series(company_id, patch).await?,
            MergeMode::Append => self.store.append_series(company_id, patch).await?,
        };

        info!(
            "Ingested {} rows into {} ({}; {} stored)",
            rows,
            document.key(),
            mode.as_str(),
            document.data.len()
        );
        Ok(IngestSummary::new(&document, rows, mode))
    }

    /// Chart view for one department; an empty document is created on first read.
    pub async fn chart_view(&self, key: &DocumentKey) -> Result<ChartView, KpiServiceError> {
        let document = self.store.find_or_create(key, Utc::now()).await?;
        debug!("Loaded {} ({} records)", key, document.data.len());
        Ok(ChartView::from(&document))
    }

    /// Fan out the eight department reads concurrently.
    pub async fn dashboard(&self, company_id: &str) -> Result<CeoDashboard, KpiServiceError> {
        let documents = self.all_departments(company_id).await?;

        let mut dashboard = CeoDashboard {
            kpis: BTreeMap::new(),
            selected_kpis: BTreeMap::new(),
            layouts: BTreeMap::new(),
        };
        for (department, document) in documents {
            let key = department.key();
            match document {
                Some(document) => {
                    dashboard.kpis.insert(key, format_for_charts(&document.data));
                    dashboard.selected_kpis.insert(key, document.selected_kpis.clone());
                    dashboard.layouts.insert(key, document.layout_or_default());
                }
                None => {
                    dashboard.kpis.insert(key, ChartSeries::new());
                    dashboard.selected_kpis.insert(key, Vec::new());
                    dashboard.layouts.insert(key, DashboardLayout::default());
                }
            }
        }
        Ok(dashboard)
    }

    /// Every department document for the company, in department order.
    pub async fn all_departments(
        &self,
        company_id: &str,
    ) -> Result<Vec<(Department, Option<KpiDocument>)>, KpiServiceError> {
        let reads = Department::ALL.into_iter().map(|department| {
            let key = DocumentKey::new(company_id, department);
            async move { self.store.find(&key).await.map(|document| (department, document)) }
        });
        Ok(try_join_all(reads).await?)
    }

    /// Upsert an empty layout for every department.
    pub async fn init_layouts(&self, company_id: &str) -> Result<DashboardLayout, KpiServiceError> {
        let layout = DashboardLayout::default();
        let now = Utc::now();
        let writes = Department::ALL.into_iter().map(|department| {
            let key = DocumentKey::new(company_id, department);
            let layout = &layout;
            async move { self.store.save_layout(&key, layout, true, now).await }
        });
        try_join_all(writes).await?;
        info!("Initialised dashboard layouts for company {}", company_id);
        Ok(layout)
    }

    /// Upsert the given per-department layouts; unknown department keys are
    /// ignored. Returns the departments that were written.
    pub async fn save_layouts(
        &self,
        company_id: &str,
        layouts: HashMap<String, DashboardLayout>,
    ) -> Result<Vec<Department>, KpiServiceError> {
        let now = Utc::now();
        let known: Vec<(Department, DashboardLayout)> = layouts
            .into_iter()
            .filter_map(|(name, layout)| name.parse::<Department>().ok().map(|d| (d, layout)))
            .collect();

        let writes = known.iter().map(|(department, layout)| {
            let key = DocumentKey::new(company_id, *department);
            async move { self.store.save_layout(&key, layout, true, now).await }
        });
        try_join_all(writes).await?;

        let mut saved: Vec<Department> = known.into_iter().map(|(d, _)| d).collect();
        saved.sort();
        info!("Saved {} dashboard layouts for company {}", saved.len(), company_id);
        Ok(saved)
    }

    /// Reset the layout of every existing department document to empty.
    /// Returns how many documents were touched.
    pub async fn reset_layouts(&self, company_id: &str) -> Result<usize, KpiServiceError> {
        let layout = DashboardLayout::default();
        let now = Utc::now();
        let writes = Department::ALL.into_iter().map(|department| {
            let key = DocumentKey::new(company_id, department);
            let layout = &layout;
            async move { self.store.save_layout(&key, layout, false, now).await }
        });
        let touched = try_join_all(writes).await?.into_iter().flatten().count();
        info!("Reset {} dashboard layouts for company {}", touched, company_id);
        Ok(touched)
    }
}
