// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Performance heatmap: deterministic cell values per dimension and metric, plus colour buckets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::FilterError;

pub const TIME_LABELS: [&str; 13] = [
    "10:00", "10:15", "10:30", "10:45", "11:00", "11:15", "11:30", "11:45", "12:00", "12:15",
    "12:30", "12:45", "13:00",
];

const BUCKET_COLORS: [&str; 5] = ["#E3F2FD", "#BBDEFB", "#90CAF9", "#42A5F5", "#1565C0"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeatmapDimension {
    #[default]
    Index,
    Node,
    User,
    Role,
    WlmGroup,
    Shape,
}

impl HeatmapDimension {
    pub const ALL: [HeatmapDimension; 6] = [
        Self::Index,
        Self::Node,
        Self::User,
        Self::Role,
        Self::WlmGroup,
        Self::Shape,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Node => "node",
            Self::User => "user",
            Self::Role => "role",
            Self::WlmGroup => "wlmGroup",
            Self::Shape => "shape",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Index => "Index",
            Self::Node => "Node",
            Self::User => "User",
            Self::Role => "Role",
            Self::WlmGroup => "WLM Group",
            Self::Shape => "Shape",
        }
    }

    pub fn rows(&self) -> [&'static str; 4] {
        match self {
            Self::Index => ["orders-*", "users-*", "logs-*", "metrics-*"],
            Self::Node => ["node-1", "node-2", "node-3", "node-4"],
            Self::User => ["user_admin", "user_analyst", "user_dev", "user_guest"],
            Self::Role => ["admin", "analyst", "developer", "viewer"],
            Self::WlmGroup => ["group1", "group2", "group3", "group4"],
            Self::Shape => ["shape_A", "shape_B", "shape_C", "shape_D"],
        }
    }
}

impl FromStr for HeatmapDimension {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dim| dim.key().eq_ignore_ascii_case(s) || dim.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| FilterError::UnknownDimension(s.to_string()))
    }
}

impl fmt::Display for HeatmapDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapMetric {
    Count,
    #[default]
    Latency,
    Cpu,
    Memory,
}

impl HeatmapMetric {
    pub const ALL: [HeatmapMetric; 4] = [Self::Count, Self::Latency, Self::Cpu, Self::Memory];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Latency => "latency",
            Self::Cpu => "cpu",
            Self::Memory => "memory",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Latency => "Latency",
            Self::Cpu => "CPU Time",
            Self::Memory => "Memory Usage",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Count => "",
            Self::Latency | Self::Cpu => "ms",
            Self::Memory => "MB",
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Count => (10.0, 60.0),
            Self::Latency => (100.0, 500.0),
            Self::Cpu => (0.0, 5.0),
            Self::Memory => (50.0, 200.0),
        }
    }

    fn seed_byte(&self) -> u8 {
        self.key().as_bytes()[0]
    }
}

impl FromStr for HeatmapMetric {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| FilterError::UnknownMetric(s.to_string()))
    }
}

impl fmt::Display for HeatmapMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable pseudo-random cell value: the same row, column and metric always
/// produce the same number.
pub fn cell_value(row: usize, col: usize, metric: HeatmapMetric) -> f64 {
    let seed = (row * 1000 + col * 100) as f64 + f64::from(metric.seed_byte());
    let noise = seed.sin() * 10_000.0;
    let unit = noise - noise.floor();

    match metric {
        HeatmapMetric::Count => (unit * 50.0).floor() + 10.0,
        HeatmapMetric::Latency => (unit * 400.0).floor() + 100.0,
        HeatmapMetric::Cpu => (unit * 50.0).round() / 10.0,
        HeatmapMetric::Memory => (unit * 150.0).floor() + 50.0,
    }
}

pub fn color_for(value: f64, metric: HeatmapMetric) -> &'static str {
    let (min, max) = metric.range();
    let ratio = (value - min) / (max - min);

    if ratio <= 0.25 {
        BUCKET_COLORS[0]
    } else if ratio <= 0.5 {
        BUCKET_COLORS[1]
    } else if ratio <= 0.75 {
        BUCKET_COLORS[2]
    } else if ratio <= 0.9 {
        BUCKET_COLORS[3]
    } else {
        BUCKET_COLORS[4]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub time: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub label: &'static str,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub dimension: HeatmapDimension,
    pub metric: HeatmapMetric,
    pub unit: &'static str,
    pub rows: Vec<HeatmapRow>,
}

impl HeatmapGrid {
    pub fn build(dimension: HeatmapDimension, metric: HeatmapMetric) -> Self {
        let rows = dimension
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row_idx, label)| HeatmapRow {
                label,
                cells: TIME_LABELS
                    .into_iter()
                    .enumerate()
                    .map(|(col_idx, time)| {
                        let value = cell_value(row_idx, col_idx, metric);
                        HeatmapCell {
                            time,
                            value,
                            color: color_for(value, metric),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            dimension,
            metric,
            unit: metric.unit(),
            rows,
        }
    }
}
