// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Error kinds raised by the filter engine, catalogs and insight helpers.

use thiserror::Error;

use crate::domain::value::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter catalog misconfigured: {0}")]
    Configuration(String),

    #[error("invalid builder transition: {0}")]
    InvalidTransition(String),

    #[error("operator `{operator}` cannot be applied to {value_type} property `{property}`")]
    InvalidToken {
        property: String,
        operator: String,
        value_type: ValueType,
    },

    #[error("token index {index} out of range ({len} active tokens)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    #[error("unsupported page size {0}; expected 10, 25 or 50")]
    InvalidPageSize(usize),

    #[error("cannot parse filter expression `{0}`")]
    InvalidExpression(String),

    #[error("unknown heatmap dimension `{0}`")]
    UnknownDimension(String),

    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
