//! KPI domain: department catalogue, canonical records, CSV ingest and the
//! time-series materializer.

pub mod department;
pub mod ingest;
pub mod record;
pub mod series;
pub mod store;

pub use department::{Department, DepartmentParseError};
pub use ingest::{normalize_row, parse_csv_file, parse_inline_csv, IngestError};
pub use record::{
    ChartConfiguration, DashboardLayout, DocumentKey, KpiDocument, KpiEntry, KpiRecord, LayoutItem, MetricMap,
    MetricValue,
};
pub use series::{format_for_charts, selected_kpis, ChartPoint, ChartSeries, MergeMode, SeriesPatch};
pub use store::KpiStore;
