use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Company, CompanyProfile};
use crate::database::DatabaseError;

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find(&self, company_id: &str) -> Result<Option<Company>, DatabaseError>;

    /// Create or overwrite the profile. New companies start inactive;
    /// `isActive`, the sign-in timestamps and `createdAt` survive overwrites.
    async fn save_profile(
        &self,
        company_id: &str,
        profile: &CompanyProfile,
        now: DateTime<Utc>,
    ) -> Result<Company, DatabaseError>;

    /// Flip `isActive`, stamping `lastLogin` or `lastLogout`. `None` when the
    /// company does not exist.
    async fn set_active(
        &self,
        company_id: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Company>, DatabaseError>;
}
