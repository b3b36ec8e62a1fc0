use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Insight, InsightBody};
use crate::database::DatabaseError;

#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn find(&self, company_id: &str) -> Result<Option<Insight>, DatabaseError>;

    /// Overwrite the company's insight, creating it if absent. `createdAt`
    /// is preserved across overwrites.
    async fn upsert(&self, company_id: &str, body: &InsightBody, now: DateTime<Utc>) -> Result<Insight, DatabaseError>;

    async fn delete(&self, company_id: &str) -> Result<bool, DatabaseError>;
}
