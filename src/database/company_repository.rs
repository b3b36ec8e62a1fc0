use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::manager::DatabaseError;
use crate::company::{Company, CompanyProfile, CompanyStore};

const COLUMNS: &str = "company_id, profile, is_active, last_login, last_logout, created_at, updated_at";

/// `companies` table access
#[derive(Debug, Clone)]
pub struct PgCompanyStore {
    pool: PgPool,
}

impl PgCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn company_from_row(row: &PgRow) -> Result<Company, DatabaseError> {
        let profile: Json<CompanyProfile> = row.try_get("profile")?;
        Ok(Company {
            company_id: row.try_get("company_id")?,
            profile: profile.0,
            is_active: row.try_get("is_active")?,
            last_login: row.try_get("last_login")?,
            last_logout: row.try_get("last_logout")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl CompanyStore for PgCompanyStore {
    async fn find(&self, company_id: &str) -> Result<Option<Company>, DatabaseError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM companies WHERE company_id = $1"))
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::company_from_row).transpose()
    }

    async fn save_profile(
        &self,
        company_id: &str,
        profile: &CompanyProfile,
        now: DateTime<Utc>,
    ) -> Result<Company, DatabaseError> {
        let row = sqlx::query(&format!(
            "INSERT INTO companies (company_id, profile, created_at, updated_at) VALUES ($1, $2, $3, $3) \
             ON CONFLICT (company_id) DO UPDATE SET profile = EXCLUDED.profile, updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(Json(profile))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Self::company_from_row(&row)
    }

    async fn set_active(
        &self,
        company_id: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, DatabaseError> {
        let row = sqlx::query(&format!(
            "UPDATE companies SET is_active = $2, \
             last_login = CASE WHEN $2 THEN $3 ELSE last_login END, \
             last_logout = CASE WHEN $2 THEN last_logout ELSE $3 END, \
             updated_at = $3 \
             WHERE company_id = $1 RETURNING {COLUMNS}"
        ))
        .bind(company_id)
        .bind(active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::company_from_row).transpose()
    }
}
