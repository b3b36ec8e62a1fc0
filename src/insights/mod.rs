//! Narrative insights: storage, the analytics-service client and the KPI
//! snapshot sent to it.

pub mod analytics;
pub mod model;
pub mod snapshot;
pub mod store;

pub use analytics::{AnalyticsClient, AnalyticsError, InsightRequest};
pub use model::{Citation, Insight, InsightBody, SwotAnalysis};
pub use snapshot::kpi_snapshot;
pub use store::InsightStore;
