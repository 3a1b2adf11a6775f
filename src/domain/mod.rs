// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Domain types shared by the filter engine, repositories and insight helpers.

pub mod query;
pub mod value;
