//! Time-series materializer: the save-side patch builder and the
//! chart-side reshaping of stored records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::department::Department;
use super::record::{KpiEntry, KpiRecord, MetricValue};

/// Union of metric keys across a batch, in first-seen order.
pub fn selected_kpis<'a>(records: impl IntoIterator<Item = &'a KpiRecord>) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for record in records {
        for key in record.metrics.keys() {
            if !selected.iter().any(|k| k == key) {
                selected.push(key.to_string());
            }
        }
    }
    selected
}

/// How a batch is merged into the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Overwrite `data` and `selectedKPIs`.
    Replace,
    /// Push onto `data`; `selectedKPIs` untouched.
    Append,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Replace => "replace",
            MergeMode::Append => "append",
        }
    }
}

/// Everything a store needs to apply one ingest batch atomically.
#[derive(Debug, Clone)]
pub struct SeriesPatch {
    pub department: Department,
    pub records: Vec<KpiRecord>,
    pub selected_kpis: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl SeriesPatch {
    pub fn new(department: Department, entries: Vec<KpiEntry>, updated_at: DateTime<Utc>) -> Self {
        let records: Vec<KpiRecord> = entries
            .into_iter()
            .map(|entry| KpiRecord::from_entry(entry, department))
            .collect();
        let selected_kpis = selected_kpis(&records);
        Self {
            department,
            records,
            selected_kpis,
            updated_at,
        }
    }
}

/// One chart point. Scalars serialize as `{month, value}`; composites as
/// `{month, ...subfields}` with no `value` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Scalar { month: String, value: Option<f64> },
    Composite(Map<String, Value>),
}

impl ChartPoint {
    fn new(month: &str, value: &MetricValue) -> Self {
        match value {
            MetricValue::Composite(fields) => {
                let mut point = Map::with_capacity(fields.len() + 1);
                point.insert("month".to_string(), Value::String(month.to_string()));
                // sub-fields win over `month`, as with an object spread
                point.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                ChartPoint::Composite(point)
            }
            other => ChartPoint::Scalar {
                month: month.to_string(),
                value: other.as_number(),
            },
        }
    }

    pub fn month(&self) -> Option<&str> {
        match self {
            ChartPoint::Scalar { month, .. } => Some(month),
            ChartPoint::Composite(map) => map.get("month").and_then(Value::as_str),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            ChartPoint::Scalar { value, .. } => *value,
            ChartPoint::Composite(_) => None,
        }
    }
}

/// Metric name → chronological points.
pub type ChartSeries = BTreeMap<String, Vec<ChartPoint>>;

/// Reshape stored records into per-metric chart series.
///
/// Works on a sorted copy; the input slice is left untouched. The sort is
/// stable so records sharing a date keep their stored order.
pub fn format_for_charts(records: &[KpiRecord]) -> ChartSeries {
    let mut sorted: Vec<&KpiRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.date);

    let mut series = ChartSeries::new();
    for record in sorted {
        let month = record.date.format("%Y-%m").to_string();
        for (key, value) in record.metrics.iter() {
            series
                .entry(key.to_string())
                .or_default()
                .push(ChartPoint::new(&month, value));
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::record::MetricMap;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(y: i32, m: u32, metrics: &[(&str, MetricValue)]) -> KpiRecord {
        KpiRecord {
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            department: Department::Saas,
            metrics: metrics.iter().cloned().collect::<MetricMap>(),
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(format_for_charts(&[]).is_empty());
    }

    #[test]
    fn points_are_sorted_by_month_without_touching_input() {
        let records = vec![
            record(2024, 3, &[("revenue", MetricValue::Number(3.0))]),
            record(2024, 1, &[("revenue", MetricValue::Number(1.0))]),
            record(2024, 2, &[("revenue", MetricValue::Number(2.0))]),
        ];
        let before = records.clone();

        let series = format_for_charts(&records);
        let months: Vec<&str> = series["revenue"].iter().filter_map(ChartPoint::month).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(records, before);

        // idempotent
        assert_eq!(format_for_charts(&records), series);
    }

    #[test]
    fn scalar_and_composite_shapes() {
        let composite = json!({"dau": 5, "wau": 20}).as_object().unwrap().clone();
        let records = vec![record(
            2024,
            1,
            &[
                ("revenue", MetricValue::Number(100.0)),
                ("activeUsers", MetricValue::Composite(composite)),
                ("churn", MetricValue::Missing),
            ],
        )];

        let v = serde_json::to_value(format_for_charts(&records)).unwrap();
        assert_eq!(v["revenue"], json!([{"month": "2024-01", "value": 100.0}]));
        assert_eq!(v["activeUsers"], json!([{"month": "2024-01", "dau": 5, "wau": 20}]));
        assert_eq!(v["churn"], json!([{"month": "2024-01", "value": null}]));
    }

    #[test]
    fn equal_dates_keep_stored_order() {
        let records = vec![
            record(2024, 1, &[("mrr", MetricValue::Number(1.0))]),
            record(2024, 1, &[("mrr", MetricValue::Number(2.0))]),
        ];
        let values: Vec<Option<f64>> = format_for_charts(&records)["mrr"].iter().map(ChartPoint::value).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn selected_kpis_is_first_seen_union() {
        let records = vec![
            record(2024, 1, &[("x", MetricValue::Number(1.0))]),
            record(2024, 2, &[("y", MetricValue::Number(2.0)), ("x", MetricValue::Missing)]),
        ];
        assert_eq!(selected_kpis(&records), vec!["x", "y"]);
    }

    #[test]
    fn patch_stamps_department_on_every_record() {
        let entry = KpiEntry {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            metrics: vec![("oee", MetricValue::Number(0.8))].into_iter().collect(),
        };
        let patch = SeriesPatch::new(Department::Manufacturing, vec![entry], Utc::now());
        assert_eq!(patch.records[0].department, Department::Manufacturing);
        assert_eq!(patch.selected_kpis, vec!["oee"]);
    }
}
