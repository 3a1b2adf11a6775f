// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Library entry point exposing the filter engine and its collaborators to the CLI and integration tests.

pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod insights;
pub mod repository;
pub mod state;
pub mod telemetry;
