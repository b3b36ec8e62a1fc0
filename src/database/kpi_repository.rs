use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::manager::DatabaseError;
use crate::kpi::{
    ChartConfiguration, DashboardLayout, Department, DocumentKey, KpiDocument, KpiRecord, KpiStore, SeriesPatch,
};

const COLUMNS: &str =
    "company_id, department, selected_kpis, data, dashboard_layout, chart_configurations, last_updated";

/// `kpi_documents` table access. One row per (company, department).
#[derive(Debug, Clone)]
pub struct PgKpiStore {
    pool: PgPool,
}

impl PgKpiStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn document_from_row(row: &PgRow) -> Result<KpiDocument, DatabaseError> {
        let department: String = row.try_get("department")?;
        let department = department
            .parse::<Department>()
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        let data: Json<Vec<KpiRecord>> = row.try_get("data")?;
        let layout: Option<Json<DashboardLayout>> = row.try_get("dashboard_layout")?;
        let charts: Json<Vec<ChartConfiguration>> = row.try_get("chart_configurations")?;

        Ok(KpiDocument {
            company_id: row.try_get("company_id")?,
            department,
            selected_kpis: row.try_get("selected_kpis")?,
            data: data.0,
            dashboard_layout: layout.map(|l| l.0),
            chart_configurations: charts.0,
            last_updated: row.try_get("last_updated")?,
        })
    }

    fn optional(row: Option<PgRow>) -> Result<Option<KpiDocument>, DatabaseError> {
        row.as_ref().map(Self::document_from_row).transpose()
    }
}

#[async_trait]
impl KpiStore for PgKpiStore {
    async fn find(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM kpi_documents WHERE company_id = $1 AND department = $2");
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn find_or_create(&self, key: &DocumentKey, now: DateTime<Utc>) -> Result<KpiDocument, DatabaseError> {
        // no-op update so RETURNING yields the existing row on conflict
        let sql = format!(
            "INSERT INTO kpi_documents (company_id, department, last_updated) VALUES ($1, $2, $3) \
             ON CONFLICT (company_id, department) DO UPDATE SET company_id = EXCLUDED.company_id \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Self::document_from_row(&row)
    }

    async fn replace_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError> {
        let sql = format!(
            "INSERT INTO kpi_documents (company_id, department, selected_kpis, data, last_updated) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (company_id, department) DO UPDATE SET \
               selected_kpis = EXCLUDED.selected_kpis, \
               data = EXCLUDED.data, \
               last_updated = EXCLUDED.last_updated \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(company_id)
            .bind(patch.department.key())
            .bind(&patch.selected_kpis)
            .bind(Json(&patch.records))
            .bind(patch.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Self::document_from_row(&row)
    }

    async fn append_series(&self, company_id: &str, patch: SeriesPatch) -> Result<KpiDocument, DatabaseError> {
        let sql = format!(
            "INSERT INTO kpi_documents (company_id, department, data, last_updated) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (company_id, department) DO UPDATE SET \
               data = kpi_documents.data || EXCLUDED.data, \
               last_updated = EXCLUDED.last_updated \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(company_id)
            .bind(patch.department.key())
            .bind(Json(&patch.records))
            .bind(patch.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Self::document_from_row(&row)
    }

    async fn delete(&self, key: &DocumentKey) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM kpi_documents WHERE company_id = $1 AND department = $2")
            .bind(&key.company_id)
            .bind(key.department.key())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn select_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE kpi_documents SET selected_kpis = \
               CASE WHEN $3 = ANY(selected_kpis) THEN selected_kpis ELSE array_append(selected_kpis, $3) END \
             WHERE company_id = $1 AND department = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .bind(kpi_id)
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn deselect_kpi(&self, key: &DocumentKey, kpi_id: &str) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE kpi_documents SET selected_kpis = array_remove(selected_kpis, $3) \
             WHERE company_id = $1 AND department = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .bind(kpi_id)
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn save_layout(
        &self,
        key: &DocumentKey,
        layout: &DashboardLayout,
        upsert: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        let row = if upsert {
            let sql = format!(
                "INSERT INTO kpi_documents (company_id, department, dashboard_layout, last_updated) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (company_id, department) DO UPDATE SET dashboard_layout = EXCLUDED.dashboard_layout \
                 RETURNING {COLUMNS}"
            );
            sqlx::query(&sql)
                .bind(&key.company_id)
                .bind(key.department.key())
                .bind(Json(layout))
                .bind(now)
                .fetch_optional(&self.pool)
                .await?
        } else {
            let sql = format!(
                "UPDATE kpi_documents SET dashboard_layout = $3 \
                 WHERE company_id = $1 AND department = $2 \
                 RETURNING {COLUMNS}"
            );
            sqlx::query(&sql)
                .bind(&key.company_id)
                .bind(key.department.key())
                .bind(Json(layout))
                .fetch_optional(&self.pool)
                .await?
        };
        Self::optional(row)
    }

    async fn clear_layout(&self, key: &DocumentKey) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE kpi_documents SET dashboard_layout = NULL \
             WHERE company_id = $1 AND department = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn set_chart_configurations(
        &self,
        key: &DocumentKey,
        configurations: &[ChartConfiguration],
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE kpi_documents SET chart_configurations = $3 \
             WHERE company_id = $1 AND department = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .bind(Json(configurations))
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn upsert_chart_configuration(
        &self,
        key: &DocumentKey,
        configuration: &ChartConfiguration,
    ) -> Result<Option<KpiDocument>, DatabaseError> {
        let sql = format!(
            "UPDATE kpi_documents SET chart_configurations = CASE \
               WHEN EXISTS (SELECT 1 FROM jsonb_array_elements(chart_configurations) e WHERE e->>'kpiId' = $3) \
               THEN (SELECT jsonb_agg( \
                       CASE WHEN t.e->>'kpiId' = $3 \
                            THEN t.e || jsonb_build_object('chartType', $4::text) \
                            ELSE t.e END ORDER BY t.ord) \
                     FROM jsonb_array_elements(chart_configurations) WITH ORDINALITY AS t(e, ord)) \
               ELSE chart_configurations || jsonb_build_array(jsonb_build_object('kpiId', $3::text, 'chartType', $4::text)) \
             END \
             WHERE company_id = $1 AND department = $2 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&key.company_id)
            .bind(key.department.key())
            .bind(&configuration.kpi_id)
            .bind(&configuration.chart_type)
            .fetch_optional(&self.pool)
            .await?;
        Self::optional(row)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
