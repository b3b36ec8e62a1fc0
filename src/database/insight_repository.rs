use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::manager::DatabaseError;
use crate::insights::{Insight, InsightBody, InsightStore};

/// `insights` table access, one row per company
#[derive(Debug, Clone)]
pub struct PgInsightStore {
    pool: PgPool,
}

impl PgInsightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn insight_from_row(row: &PgRow) -> Result<Insight, DatabaseError> {
        let body: Json<InsightBody> = row.try_get("body")?;
        Ok(Insight {
            company_id: row.try_get("company_id")?,
            body: body.0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn find(&self, company_id: &str) -> Result<Option<Insight>, DatabaseError> {
        let row = sqlx::query("SELECT company_id, body, created_at, updated_at FROM insights WHERE company_id = $1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::insight_from_row).transpose()
    }

    async fn upsert(&self, company_id: &str, body: &InsightBody, now: DateTime<Utc>) -> Result<Insight, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO insights (company_id, body, created_at, updated_at) VALUES ($1, $2, $3, $3) \
             ON CONFLICT (company_id) DO UPDATE SET body = EXCLUDED.body, updated_at = EXCLUDED.updated_at \
             RETURNING company_id, body, created_at, updated_at",
        )
        .bind(company_id)
        .bind(Json(body))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Self::insight_from_row(&row)
    }

    async fn delete(&self, company_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM insights WHERE company_id = $1")
            .bind(company_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
