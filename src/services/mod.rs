pub mod company_service;
pub mod insight_service;
pub mod kpi_service;

pub use company_service::{CompanyService, CompanyServiceError};
pub use insight_service::{InsightService, InsightServiceError};
pub use kpi_service::{CeoDashboard, ChartView, IngestSummary, KpiService, KpiServiceError};
