use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthError, IssuedToken, TokenAuthority};
use crate::company::{Company, CompanyProfile, CompanyStore};
use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum CompanyServiceError {
    #[error("Company not found")]
    NotFound(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Company profiles and the active flag that bearer authentication checks.
#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn CompanyStore>,
}

impl CompanyService {
    pub fn new(store: Arc<dyn CompanyStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, company_id: &str) -> Result<Company, CompanyServiceError> {
        self.store
            .find(company_id)
            .await?
            .ok_or_else(|| CompanyServiceError::NotFound(company_id.to_string()))
    }

    pub async fn save_profile(&self, company_id: &str, profile: &CompanyProfile) -> Result<Company, CompanyServiceError> {
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(CompanyServiceError::MissingFields(missing));
        }
        let company = self.store.save_profile(company_id, profile, Utc::now()).await?;
        info!("Saved profile for company {}", company_id);
        Ok(company)
    }

    /// Mark the company active and issue a token for it.
    pub async fn sign_in(&self, tokens: &TokenAuthority, company_id: &str) -> Result<IssuedToken, CompanyServiceError> {
        self.store
            .set_active(company_id, true, Utc::now())
            .await?
            .ok_or_else(|| CompanyServiceError::NotFound(company_id.to_string()))?;
        let issued = tokens.issue(company_id)?;
        info!("Company {} signed in (token {})", company_id, issued.token_id);
        Ok(issued)
    }

    pub async fn sign_out(&self, company_id: &str) -> Result<(), CompanyServiceError> {
        self.store
            .set_active(company_id, false, Utc::now())
            .await?
            .ok_or_else(|| CompanyServiceError::NotFound(company_id.to_string()))?;
        info!("Company {} signed out", company_id);
        Ok(())
    }
}
