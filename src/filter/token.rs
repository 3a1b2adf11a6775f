// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Committed filter clauses and the textual `property operator value` form used by the CLI.

use std::fmt;

use serde::Serialize;

use crate::error::{FilterError, FilterResult};

use super::catalog::{FilterCatalog, Operator, OperatorKind, Property};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterToken {
    property: Property,
    operator: Operator,
    value: String,
}

impl FilterToken {
    pub fn new(property: Property, operator: Operator, value: impl Into<String>) -> FilterResult<Self> {
        if !operator.applies_to(property.value_type) {
            return Err(FilterError::InvalidToken {
                property: property.key,
                operator: operator.symbol,
                value_type: property.value_type,
            });
        }

        Ok(Self {
            property,
            operator,
            value: value.into(),
        })
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.property.label, self.operator.symbol, self.value
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterExpression<'a> {
    pub property: &'a Property,
    pub operator: &'a Operator,
    pub value: String,
}

impl<'a> FilterExpression<'a> {
    /// Accepts the property key or label, the first operator symbol after it
    /// (longest match wins) and a non-empty value: `latency >= 500`,
    /// `Node=node1`, `Date and Time > 2024-01-14`.
    pub fn parse(text: &str, catalog: &'a FilterCatalog) -> FilterResult<Self> {
        let invalid = || FilterError::InvalidExpression(text.to_string());

        let (position, kind) = text
            .char_indices()
            .find_map(|(idx, _)| {
                OperatorKind::BY_SYMBOL_LENGTH
                    .into_iter()
                    .find(|kind| text[idx..].starts_with(kind.symbol()))
                    .map(|kind| (idx, kind))
            })
            .ok_or_else(invalid)?;

        let name = text[..position].trim();
        let value = text[position + kind.symbol().len()..].trim();
        if name.is_empty() || value.is_empty() {
            return Err(invalid());
        }

        let property = catalog
            .properties()
            .find(name)
            .ok_or_else(|| FilterError::UnknownProperty(name.to_string()))?;
        let operator = catalog
            .operator(kind.symbol())
            .ok_or_else(|| FilterError::UnknownOperator(kind.symbol().to_string()))?;

        Ok(Self {
            property,
            operator,
            value: value.to_string(),
        })
    }
}
