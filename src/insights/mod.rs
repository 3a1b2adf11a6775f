// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Dashboard insight panels derived from query rows.

pub mod heatmap;
pub mod summary;
