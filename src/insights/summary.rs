// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Average and percentile cards computed from the rows currently in view.

use serde::Serialize;

use crate::domain::query::{FIELD_CPU, FIELD_LATENCY, FIELD_MEMORY};
use crate::domain::value::Row;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSummary {
    pub field: String,
    pub unit: &'static str,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub p90: f64,
    pub p99: f64,
}

pub fn dashboard_summaries<'a, I>(rows: I) -> Vec<MetricSummary>
where
    I: IntoIterator<Item = &'a Row> + Clone,
{
    [(FIELD_LATENCY, "ms"), (FIELD_CPU, "%"), (FIELD_MEMORY, "MB")]
        .into_iter()
        .filter_map(|(field, unit)| summarize(rows.clone(), field, unit))
        .collect()
}

/// Rows whose field is missing or not numeric are left out. `None` when no row
/// contributes a value.
pub fn summarize<'a, I>(rows: I, field: &str, unit: &'static str) -> Option<MetricSummary>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut values: Vec<f64> = rows
        .into_iter()
        .filter_map(|row| row.get(field).and_then(|value| value.as_number()))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let average = values.iter().sum::<f64>() / count as f64;

    Some(MetricSummary {
        field: field.to_string(),
        unit,
        count,
        min: values[0],
        max: values[count - 1],
        average,
        p90: percentile(&values, 90.0),
        p99: percentile(&values, 99.0),
    })
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
