use serde_json::{Map, Value};

use crate::kpi::{format_for_charts, ChartPoint, KpiDocument};

/// Fold the company's KPI documents into `{kpiName: latestValue}`.
///
/// Documents are visited in the order given (callers pass them in
/// department order), so a later department overrides an equally named KPI
/// from an earlier one. Only selected KPIs contribute, and only scalar
/// points; the chronologically last scalar point wins, `null` included.
pub fn kpi_snapshot<'a>(documents: impl IntoIterator<Item = &'a KpiDocument>) -> Map<String, Value> {
    let mut snapshot = Map::new();

    for document in documents {
        let series = format_for_charts(&document.data);
        for (name, points) in series {
            if !document.selected_kpis.contains(&name) {
                continue;
            }
            let latest = points.iter().rev().find_map(|point| match point {
                ChartPoint::Scalar { value, .. } => Some(*value),
                ChartPoint::Composite(_) => None,
            });
            if let Some(value) = latest {
                snapshot.insert(name, value.map(Value::from).unwrap_or(Value::Null));
            }
        }
    }

    snapshot
}
