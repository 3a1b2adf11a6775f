// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Fixed in-memory rows, either built in code or read from a JSON export.

use anyhow::{Context, Result};

use crate::domain::value::Row;

use super::QueryRepository;

#[derive(Clone, Debug, Default)]
pub struct InMemoryQueryRepository {
    rows: Vec<Row>,
}

impl InMemoryQueryRepository {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let rows: Vec<Row> =
            serde_json::from_str(text).context("query rows must be a JSON array of objects")?;
        Ok(Self::new(rows))
    }
}

impl QueryRepository for InMemoryQueryRepository {
    fn load(&self) -> Result<Vec<Row>> {
        Ok(self.rows.clone())
    }

    fn source_name(&self) -> &str {
        "in-memory"
    }
}
