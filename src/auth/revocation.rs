use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::database::DatabaseError;

/// A revoked token, remembered until its natural expiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevokedToken {
    pub token_id: Uuid,
    pub company_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Shared revocation list keyed by token id (`jti`).
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Idempotent; revoking twice keeps the first entry.
    async fn revoke(&self, token: &RevokedToken) -> Result<(), DatabaseError>;

    /// True only while the entry has not yet expired.
    async fn is_revoked(&self, token_id: Uuid, now: DateTime<Utc>) -> Result<bool, DatabaseError>;

    /// Drop entries whose expiry has passed; returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError>;
}

/// Background sweep of expired revocations. The first sweep runs immediately.
pub fn spawn_purge_task(store: Arc<dyn RevocationStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired(Utc::now()).await {
                Ok(0) => tracing::debug!("No expired token revocations to purge"),
                Ok(purged) => tracing::info!("Purged {} expired token revocations", purged),
                Err(e) => tracing::warn!("Failed to purge token revocations: {}", e),
            }
        }
    })
}
