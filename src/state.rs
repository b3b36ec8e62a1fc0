use std::sync::Arc;

use crate::auth::{RevocationStore, TokenAuthority};
use crate::company::CompanyStore;
use crate::insights::{AnalyticsClient, InsightStore};
use crate::kpi::KpiStore;

/// Shared handler state. Stores sit behind trait objects so the same router
/// runs on PostgreSQL or on the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub companies: Arc<dyn CompanyStore>,
    pub kpis: Arc<dyn KpiStore>,
    pub revocations: Arc<dyn RevocationStore>,
    pub insights: Arc<dyn InsightStore>,
    pub tokens: TokenAuthority,
    pub analytics: AnalyticsClient,
}

impl AppState {
    /// State backed entirely by in-process stores
    pub fn in_memory(tokens: TokenAuthority, analytics: AnalyticsClient) -> Self {
        use crate::database::{MemoryCompanyStore, MemoryInsightStore, MemoryKpiStore, MemoryRevocationStore};

        Self {
            companies: Arc::new(MemoryCompanyStore::new()),
            kpis: Arc::new(MemoryKpiStore::new()),
            revocations: Arc::new(MemoryRevocationStore::new()),
            insights: Arc::new(MemoryInsightStore::new()),
            tokens,
            analytics,
        }
    }

    /// State backed by PostgreSQL tables on the given pool
    pub fn postgres(pool: sqlx::PgPool, tokens: TokenAuthority, analytics: AnalyticsClient) -> Self {
        use crate::database::{PgCompanyStore, PgInsightStore, PgKpiStore, PgRevocationStore};

        Self {
            companies: Arc::new(PgCompanyStore::new(pool.clone())),
            kpis: Arc::new(PgKpiStore::new(pool.clone())),
            revocations: Arc::new(PgRevocationStore::new(pool.clone())),
            insights: Arc::new(PgInsightStore::new(pool)),
            tokens,
            analytics,
        }
    }
}
