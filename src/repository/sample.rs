// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Synthetic query records for demos and tests; seeded runs are reproducible.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::query::QueryRecord;
use crate::domain::value::Row;

use super::QueryRepository;

pub const DEFAULT_SAMPLE_ROWS: usize = 50;

const QUERY_TYPES: [&str; 4] = ["Group", "Search", "Aggregation", "Match"];
const SEARCH_TYPES: [&str; 3] = ["DFS", "Query Then Fetch", "Query And Fetch"];
const NODES: [&str; 3] = ["node1", "node2", "node3"];
const INDICES: [&str; 3] = ["index1", "index2", "index3"];
const WLM_GROUPS: [&str; 3] = ["group1", "group2", "group3"];
const DAY_MILLIS: f64 = 86_400_000.0;

#[derive(Clone, Debug)]
pub struct SampleQueryRepository {
    count: usize,
    seed: Option<u64>,
    anchor: DateTime<Utc>,
}

impl SampleQueryRepository {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            seed: None,
            anchor: Utc::now(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Timestamps fall within the 24 hours before this instant.
    pub fn anchored_at(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn generate(&self) -> Vec<QueryRecord> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        (1..=self.count)
            .map(|n| QueryRecord {
                id: format!("q{n}"),
                query_type: pick(&mut rng, &QUERY_TYPES),
                search_type: pick(&mut rng, &SEARCH_TYPES),
                node: pick(&mut rng, &NODES),
                index: pick(&mut rng, &INDICES),
                wlm_group: pick(&mut rng, &WLM_GROUPS),
                latency: format!("{:.2} ms", rng.gen::<f64>() * 1000.0),
                cpu: format!("{:.2}%", rng.gen::<f64>() * 100.0),
                memory: format!("{:.0} MB", rng.gen::<f64>() * 1024.0),
                timestamp: self.anchor
                    - Duration::milliseconds((rng.gen::<f64>() * DAY_MILLIS) as i64),
            })
            .collect()
    }
}

impl Default for SampleQueryRepository {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_ROWS)
    }
}

impl QueryRepository for SampleQueryRepository {
    fn load(&self) -> Result<Vec<Row>> {
        let rows: Vec<Row> = self
            .generate()
            .into_iter()
            .map(QueryRecord::into_row)
            .collect();
        tracing::debug!(rows = rows.len(), seed = ?self.seed, "sample query rows generated");
        Ok(rows)
    }

    fn source_name(&self) -> &str {
        "sample"
    }
}

fn pick(rng: &mut StdRng, options: &[&str]) -> String {
    options[rng.gen_range(0..options.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seeded_generation_is_reproducible() {
        let anchor = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let first = SampleQueryRepository::new(20)
            .with_seed(Some(7))
            .anchored_at(anchor)
            .generate();
        let second = SampleQueryRepository::new(20)
            .with_seed(Some(7))
            .anchored_at(anchor)
            .generate();

        assert_eq!(first, second);
        assert_eq!(first.len(), 20);
        assert_eq!(first[0].id, "q1");
        assert_eq!(first[19].id, "q20");
    }

    #[test]
    fn records_stay_within_dashboard_ranges() {
        let anchor = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let records = SampleQueryRepository::default()
            .with_seed(Some(42))
            .anchored_at(anchor)
            .generate();
        assert_eq!(records.len(), DEFAULT_SAMPLE_ROWS);

        for record in &records {
            assert!(NODES.contains(&record.node.as_str()));
            assert!(record.latency.ends_with(" ms"));
            assert!(record.cpu.ends_with('%'));
            assert!(record.memory.ends_with(" MB"));
            assert!(record.timestamp <= anchor);
            assert!(record.timestamp >= anchor - Duration::days(1));
        }
    }

    #[test]
    fn load_returns_rows() {
        let rows = SampleQueryRepository::new(3)
            .with_seed(Some(1))
            .load()
            .expect("sample rows");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.get("timestamp").is_some()));
    }
}
