// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Row inclusion: every token must hold and, when present, the free text must appear in some field.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::value::{parse_number, parse_timestamp, FieldValue, Row, ValueType};

use super::catalog::OperatorKind;
use super::token::FilterToken;

pub fn matches(row: &Row, tokens: &[FilterToken], free_text: &str) -> bool {
    tokens.iter().all(|token| token_matches(row, token)) && free_text_matches(row, free_text)
}

pub fn filter_rows<'a>(rows: &'a [Row], tokens: &[FilterToken], free_text: &str) -> Vec<&'a Row> {
    let matched: Vec<&Row> = rows
        .iter()
        .filter(|row| matches(row, tokens, free_text))
        .collect();
    tracing::debug!(
        total = rows.len(),
        matched = matched.len(),
        tokens = tokens.len(),
        "rows filtered"
    );
    matched
}

/// Missing fields never match, whatever the operator.
pub fn token_matches(row: &Row, token: &FilterToken) -> bool {
    let Some(field) = row.get(&token.property().key) else {
        return false;
    };
    let kind = token.operator().kind();

    match token.property().value_type {
        ValueType::Number => match (field.as_number(), parse_number(token.value())) {
            (Some(actual), Some(expected)) => compare_numbers(kind, actual, expected),
            _ => {
                tracing::trace!(token = %token, "number comparison skipped: unparsable value");
                false
            }
        },
        ValueType::Date => match (field.as_timestamp(), parse_timestamp(token.value())) {
            (Some(actual), Some(expected)) => compare_dates(kind, actual, expected),
            _ => {
                tracing::trace!(token = %token, "date comparison skipped: unparsable value");
                false
            }
        },
        ValueType::Enum => compare_text(kind, field, token.value()),
    }
}

pub fn free_text_matches(row: &Row, free_text: &str) -> bool {
    if free_text.is_empty() {
        return true;
    }

    let needle = free_text.to_lowercase();
    row.iter().any(|(_, value)| {
        value
            .display_text()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

fn compare_numbers(kind: OperatorKind, actual: f64, expected: f64) -> bool {
    match actual.partial_cmp(&expected) {
        Some(ordering) => ordering_holds(kind, ordering),
        None => false,
    }
}

/// Equality works on the UTC calendar day, ordering on the full instant.
fn compare_dates(kind: OperatorKind, actual: DateTime<Utc>, expected: DateTime<Utc>) -> bool {
    match kind {
        OperatorKind::Equals => actual.date_naive() == expected.date_naive(),
        OperatorKind::NotEquals => actual.date_naive() != expected.date_naive(),
        _ => ordering_holds(kind, actual.cmp(&expected)),
    }
}

fn ordering_holds(kind: OperatorKind, ordering: Ordering) -> bool {
    match kind {
        OperatorKind::Equals => ordering == Ordering::Equal,
        OperatorKind::NotEquals => ordering != Ordering::Equal,
        OperatorKind::GreaterThan => ordering == Ordering::Greater,
        OperatorKind::LessThan => ordering == Ordering::Less,
        OperatorKind::GreaterOrEqual => ordering != Ordering::Less,
        OperatorKind::LessOrEqual => ordering != Ordering::Greater,
        // Text operators are rejected for number and date types when the registry is built.
        OperatorKind::Contains
        | OperatorKind::NotContains
        | OperatorKind::StartsWith
        | OperatorKind::NotStartsWith => false,
    }
}

fn compare_text(kind: OperatorKind, field: &FieldValue, expected: &str) -> bool {
    let Some(actual) = field.display_text() else {
        return false;
    };
    let actual = actual.to_lowercase();
    let expected = expected.to_lowercase();

    match kind {
        OperatorKind::Equals => actual == expected,
        OperatorKind::NotEquals => actual != expected,
        OperatorKind::Contains => actual.contains(&expected),
        OperatorKind::NotContains => !actual.contains(&expected),
        OperatorKind::StartsWith => actual.starts_with(&expected),
        OperatorKind::NotStartsWith => !actual.starts_with(&expected),
        // Ordering operators are rejected for enum types when the registry is built.
        OperatorKind::GreaterThan
        | OperatorKind::LessThan
        | OperatorKind::GreaterOrEqual
        | OperatorKind::LessOrEqual => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::catalog::FilterCatalog;

    fn catalog() -> FilterCatalog {
        FilterCatalog::query_insights().expect("catalog")
    }

    fn token(catalog: &FilterCatalog, key: &str, symbol: &str, value: &str) -> FilterToken {
        FilterToken::new(
            catalog.property(key).cloned().expect("property"),
            catalog.operator(symbol).cloned().expect("operator"),
            value,
        )
        .expect("valid token")
    }

    fn sample_row() -> Row {
        Row::new()
            .with("id", "q7")
            .with("queryType", "Aggregation")
            .with("node", "node1")
            .with("latency", "300 ms")
            .with("cpu", "12.50%")
            .with("timestamp", "2024-01-14T23:59:00Z")
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches(&sample_row(), &[], ""));
        assert!(matches(&Row::new(), &[], ""));
    }

    #[test]
    fn tokens_form_a_conjunction() {
        let catalog = catalog();
        let row = sample_row();
        let node = token(&catalog, "node", "=", "node1");
        let slow = token(&catalog, "latency", ">", "500");

        assert!(matches(&row, &[node.clone()], ""));
        assert!(!matches(&row, &[slow.clone()], ""));
        assert!(!matches(&row, &[slow, node], ""));
    }

    #[test]
    fn missing_field_never_matches() {
        let catalog = catalog();
        let row = Row::new().with("node", "node1");

        assert!(!token_matches(&row, &token(&catalog, "cpu", "!=", "10")));
        assert!(!token_matches(&row, &token(&catalog, "index", "!:", "x")));
        assert!(!token_matches(
            &row.clone().with("cpu", FieldValue::Null),
            &token(&catalog, "cpu", "!=", "10")
        ));
    }

    #[test]
    fn numbers_compare_after_stripping_units() {
        let catalog = catalog();
        let row = sample_row();

        assert!(token_matches(&row, &token(&catalog, "latency", "=", "300")));
        assert!(token_matches(&row, &token(&catalog, "latency", "<=", "300ms")));
        assert!(token_matches(&row, &token(&catalog, "latency", ">=", "299.99")));
        assert!(token_matches(&row, &token(&catalog, "cpu", "<", "13")));
        assert!(token_matches(&row, &token(&catalog, "cpu", "!=", "12")));
        assert!(!token_matches(&row, &token(&catalog, "cpu", ">", "12.5")));
    }

    #[test]
    fn unparsable_numbers_never_match() {
        let catalog = catalog();
        let row = sample_row().with("memory", "n/a");

        assert!(!token_matches(&row, &token(&catalog, "latency", "!=", "fast")));
        assert!(!token_matches(&row, &token(&catalog, "memory", "!=", "10")));
    }

    #[test]
    fn date_equality_uses_calendar_day_and_ordering_uses_instant() {
        let catalog = catalog();
        let row = sample_row();

        assert!(token_matches(&row, &token(&catalog, "timestamp", "=", "2024-01-14")));
        assert!(token_matches(&row, &token(&catalog, "timestamp", ">", "2024-01-14")));
        assert!(!token_matches(&row, &token(&catalog, "timestamp", "!=", "2024-01-14")));
        assert!(token_matches(&row, &token(&catalog, "timestamp", "<", "2024-01-15")));
        assert!(!token_matches(
            &row,
            &token(&catalog, "timestamp", ">", "2024-01-14T23:59:00Z")
        ));
        assert!(token_matches(
            &row,
            &token(&catalog, "timestamp", ">=", "2024-01-14T23:59:00Z")
        ));
        assert!(!token_matches(&row, &token(&catalog, "timestamp", "=", "someday")));
    }

    #[test]
    fn enum_operators_are_case_insensitive() {
        let catalog = catalog();
        let row = sample_row();

        assert!(token_matches(&row, &token(&catalog, "queryType", "=", "aggregation")));
        assert!(token_matches(&row, &token(&catalog, "queryType", ":", "GREG")));
        assert!(token_matches(&row, &token(&catalog, "queryType", "^", "agg")));
        assert!(token_matches(&row, &token(&catalog, "queryType", "!^", "Search")));
        assert!(token_matches(&row, &token(&catalog, "queryType", "!:", "match")));
        assert!(!token_matches(&row, &token(&catalog, "queryType", "!=", "AGGREGATION")));
    }

    #[test]
    fn free_text_searches_every_field() {
        let row = sample_row();
        assert!(free_text_matches(&row, "Q7"));
        assert!(free_text_matches(&row, "12.5"));
        assert!(!free_text_matches(&row, "node9"));
    }

    #[test]
    fn filter_rows_preserves_order() {
        let catalog = catalog();
        let rows = vec![
            Row::new().with("id", "q1").with("node", "node1"),
            Row::new().with("id", "q2").with("node", "node2"),
            Row::new().with("id", "q3").with("node", "node1"),
        ];
        let matched = filter_rows(&rows, &[token(&catalog, "node", "=", "node1")], "");
        let ids: Vec<_> = matched
            .iter()
            .filter_map(|row| row.get("id").and_then(FieldValue::display_text))
            .collect();
        assert_eq!(ids, vec!["q1", "q3"]);
    }
}
