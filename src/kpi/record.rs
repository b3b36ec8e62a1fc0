use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use super::department::Department;

/// A single metric observation.
///
/// `Missing` is "present but unmeasured" and serializes as `null`; it is
/// distinct from the key being absent. `Composite` carries sub-values
/// (e.g. `activeUsers = {dau, wau, mau}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Composite(Map<String, Value>),
    Missing,
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map(MetricValue::Number).unwrap_or(MetricValue::Missing)
    }
}

/// Metric name → value, in column (insertion) order.
///
/// Serialized as a plain JSON object. Order matters for deriving the
/// first-seen `selectedKPIs` list from a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMap(Vec<(String, MetricValue)>);

impl MetricMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: MetricValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, MetricValue)> for MetricMap {
    fn from_iter<I: IntoIterator<Item = (K, MetricValue)>>(iter: I) -> Self {
        let mut map = MetricMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for MetricMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetricMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MetricMapVisitor;

        impl<'de> Visitor<'de> for MetricMapVisitor {
            type Value = MetricMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of metric values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MetricMap, A::Error> {
                let mut map = MetricMap::new();
                while let Some((key, value)) = access.next_entry::<String, MetricValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MetricMapVisitor)
    }
}

/// Canonical output of the ingest normalizer: one dated row of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiEntry {
    pub date: NaiveDate,
    pub metrics: MetricMap,
}

/// A stored observation for one company in one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub date: NaiveDate,
    pub department: Department,
    pub metrics: MetricMap,
}

impl KpiRecord {
    pub fn from_entry(entry: KpiEntry, department: Department) -> Self {
        Self {
            date: entry.date,
            department,
            metrics: entry.metrics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub i: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Responsive grid layout. `lg` is mandatory on input; the smaller
/// breakpoints default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardLayout {
    pub lg: Vec<LayoutItem>,
    #[serde(default)]
    pub md: Vec<LayoutItem>,
    #[serde(default)]
    pub sm: Vec<LayoutItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfiguration {
    pub kpi_id: String,
    pub chart_type: String,
}

/// Identity of a company KPI document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub company_id: String,
    pub department: Department,
}

impl DocumentKey {
    pub fn new(company_id: impl Into<String>, department: Department) -> Self {
        Self {
            company_id: company_id.into(),
            department,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.department.slug(), self.company_id)
    }
}

/// One company's KPI document for one department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDocument {
    pub company_id: String,
    pub department: Department,
    #[serde(rename = "selectedKPIs")]
    pub selected_kpis: Vec<String>,
    pub data: Vec<KpiRecord>,
    pub dashboard_layout: Option<DashboardLayout>,
    pub chart_configurations: Vec<ChartConfiguration>,
    pub last_updated: DateTime<Utc>,
}

impl KpiDocument {
    /// Empty document, as created on first read or layout initialisation.
    pub fn empty(key: &DocumentKey, now: DateTime<Utc>) -> Self {
        Self {
            company_id: key.company_id.clone(),
            department: key.department,
            selected_kpis: Vec::new(),
            data: Vec::new(),
            dashboard_layout: None,
            chart_configurations: Vec::new(),
            last_updated: now,
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.company_id.clone(), self.department)
    }

    pub fn layout_or_default(&self) -> DashboardLayout {
        self.dashboard_layout.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metric_map_keeps_insertion_order() {
        let mut map = MetricMap::new();
        map.insert("zeta", MetricValue::Number(1.0));
        map.insert("alpha", MetricValue::Missing);
        map.insert("zeta", MetricValue::Number(2.0));

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(map.get("zeta"), Some(&MetricValue::Number(2.0)));
    }

    #[test]
    fn metric_values_serialize_as_plain_json() {
        let map: MetricMap = vec![
            ("revenue", MetricValue::Number(100.0)),
            ("churn", MetricValue::Missing),
            (
                "activeUsers",
                MetricValue::Composite(json!({"dau": 5, "wau": 20}).as_object().unwrap().clone()),
            ),
        ]
        .into_iter()
        .collect();

        let v = serde_json::to_value(&map).unwrap();
        assert_eq!(v, json!({"revenue": 100.0, "churn": null, "activeUsers": {"dau": 5, "wau": 20}}));
    }

    #[test]
    fn metric_map_deserializes_null_and_composites() {
        let map: MetricMap =
            serde_json::from_str(r#"{"b": 1.5, "a": null, "c": {"dau": 3}}"#).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(map.get("a"), Some(&MetricValue::Missing));
        assert!(matches!(map.get("c"), Some(MetricValue::Composite(_))));
    }

    #[test]
    fn layout_requires_lg_only() {
        let layout: DashboardLayout =
            serde_json::from_value(json!({"lg": [{"i": "mrr", "x": 0, "y": 0, "w": 4, "h": 2}]})).unwrap();
        assert_eq!(layout.lg.len(), 1);
        assert!(layout.md.is_empty());
        assert!(serde_json::from_value::<DashboardLayout>(json!({"md": []})).is_err());
    }

    #[test]
    fn document_uses_frontend_field_names() {
        let key = DocumentKey::new("c-1", Department::Saas);
        let doc = KpiDocument::empty(&key, Utc::now());
        let v = serde_json::to_value(&doc).unwrap();
        assert!(v.get("selectedKPIs").is_some());
        assert!(v.get("chartConfigurations").is_some());
        assert_eq!(v["department"], "saas");
    }
}
