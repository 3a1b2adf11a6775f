// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Filter token engine: catalogs, token builder, predicate evaluator and paginator.

pub mod builder;
pub mod catalog;
pub mod evaluator;
pub mod paginator;
pub mod token;

pub use builder::{BuilderOptions, BuilderState, Step, Submission, TokenBuilder};
pub use catalog::{FilterCatalog, Operator, OperatorKind, OperatorRegistry, Property, PropertyCatalog};
pub use evaluator::{filter_rows, matches};
pub use paginator::{PageSize, PageSummary, Paginator};
pub use token::{FilterExpression, FilterToken};
