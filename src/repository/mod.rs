// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Query sources feed rows into the query list; callers swap them without touching the filter engine.

pub mod in_memory;
pub mod sample;

use std::sync::Arc;

use anyhow::Result;

use crate::domain::value::Row;

pub trait QueryRepository: Send + Sync {
    fn load(&self) -> Result<Vec<Row>>;

    fn source_name(&self) -> &str;
}

pub type QueryRepositoryHandle = Arc<dyn QueryRepository>;
