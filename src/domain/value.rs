// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Typed row model: every field holds a tagged value the evaluator can coerce per property type.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Enum,
    Number,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Number => "number",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Number(n) => Some(n.to_string()),
            Self::Date(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Text(s) => Some(s.clone()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            other => other.display_text().and_then(|text| parse_number(&text)),
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Null => None,
            Self::Date(ts) => Some(*ts),
            Self::Number(millis) if millis.is_finite() => {
                DateTime::from_timestamp_millis(*millis as i64)
            }
            Self::Number(_) => None,
            Self::Text(s) => parse_timestamp(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Keeps digits and periods, then reads the longest leading `digits[.digits]`,
/// so `"1.2.3 ms"` is `1.2`. `None` only when no digit survives.
pub fn parse_number(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_point = false;
    let end = kept
        .chars()
        .take_while(|c| {
            if *c != '.' {
                return true;
            }
            !std::mem::replace(&mut seen_point, true)
        })
        .count();

    let prefix = &kept[..end];
    if !prefix.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Naive forms (no offset) are read as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Absent keys and explicit nulls both read as missing.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn number_coercion_strips_units() {
        assert_eq!(FieldValue::from("300 ms").as_number(), Some(300.0));
        assert_eq!(FieldValue::from("12.50%").as_number(), Some(12.5));
        assert_eq!(FieldValue::from("ms").as_number(), None);
        assert_eq!(FieldValue::from("1.2.3").as_number(), Some(1.2));
        assert_eq!(FieldValue::from("v1.2.3 ms").as_number(), Some(1.2));
        assert_eq!(FieldValue::from(".5%").as_number(), Some(0.5));
        assert_eq!(FieldValue::from(". ms").as_number(), None);
        assert_eq!(FieldValue::Number(42.0).as_number(), Some(42.0));
    }

    #[test]
    fn timestamp_parsing_accepts_dashboard_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-14"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-14T00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-14T00:00:00Z"), Some(midnight));
        assert_eq!(
            parse_timestamp("2024-01-14T02:00:00+02:00"),
            Some(midnight)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn row_treats_null_as_missing() {
        let row = Row::new().with("cpu", FieldValue::Null).with("node", "node1");
        assert!(row.get("cpu").is_none());
        assert!(row.get("memory").is_none());
        assert_eq!(row.get("node"), Some(&FieldValue::from("node1")));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn rows_deserialize_into_tagged_values() {
        let row: Row = serde_json::from_str(
            r#"{"id":"q1","latency":12.5,"timestamp":"2024-01-14T23:59:00Z","cpu":null}"#,
        )
        .expect("row parses");

        assert_eq!(row.get("id"), Some(&FieldValue::from("q1")));
        assert_eq!(row.get("latency"), Some(&FieldValue::Number(12.5)));
        assert!(matches!(row.get("timestamp"), Some(FieldValue::Date(_))));
        assert!(row.get("cpu").is_none());
    }
}
