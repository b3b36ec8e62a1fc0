pub mod company_repository;
pub mod insight_repository;
pub mod kpi_repository;
pub mod manager;
pub mod memory;
pub mod revocation_repository;
pub mod schema;

pub use company_repository::PgCompanyStore;
pub use insight_repository::PgInsightStore;
pub use kpi_repository::PgKpiStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryCompanyStore, MemoryInsightStore, MemoryKpiStore, MemoryRevocationStore};
pub use revocation_repository::PgRevocationStore;
