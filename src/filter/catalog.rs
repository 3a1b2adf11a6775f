// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Static lookup tables: filterable properties, their enum values and the comparison operators.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::domain::query::{
    FIELD_CPU, FIELD_INDEX, FIELD_LATENCY, FIELD_MEMORY, FIELD_NODE, FIELD_QUERY_TYPE,
    FIELD_SEARCH_TYPE, FIELD_TIMESTAMP, FIELD_WLM_GROUP,
};
use crate::domain::value::ValueType;
use crate::error::{FilterError, FilterResult};

const ALL_TYPES: [ValueType; 3] = [ValueType::Enum, ValueType::Number, ValueType::Date];
const ORDERED_TYPES: [ValueType; 2] = [ValueType::Number, ValueType::Date];
const TEXT_TYPES: [ValueType; 1] = [ValueType::Enum];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Property {
    pub key: String,
    pub label: String,
    pub value_type: ValueType,
}

impl Property {
    pub fn new(key: impl Into<String>, label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            value_type,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

impl OperatorKind {
    /// Longest symbols first so prefix scans never stop at `=` when `>=` was meant.
    pub const BY_SYMBOL_LENGTH: [OperatorKind; 10] = [
        Self::NotEquals,
        Self::NotContains,
        Self::NotStartsWith,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::Equals,
        Self::Contains,
        Self::StartsWith,
        Self::GreaterThan,
        Self::LessThan,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Contains => ":",
            Self::NotContains => "!:",
            Self::StartsWith => "^",
            Self::NotStartsWith => "!^",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::BY_SYMBOL_LENGTH
            .into_iter()
            .find(|kind| kind.symbol() == symbol)
    }

    pub fn supports(&self, value_type: ValueType) -> bool {
        match self {
            Self::Equals | Self::NotEquals => true,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::NotStartsWith => {
                value_type == ValueType::Enum
            }
            Self::GreaterThan | Self::LessThan | Self::GreaterOrEqual | Self::LessOrEqual => {
                value_type != ValueType::Enum
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Operator {
    kind: OperatorKind,
    pub symbol: String,
    pub label: String,
    pub applicable_types: Vec<ValueType>,
}

impl Operator {
    pub fn new(
        symbol: &str,
        label: impl Into<String>,
        applicable_types: &[ValueType],
    ) -> FilterResult<Self> {
        let kind = OperatorKind::from_symbol(symbol).ok_or_else(|| {
            FilterError::Configuration(format!("operator symbol `{symbol}` is not recognised"))
        })?;

        if let Some(unsupported) = applicable_types.iter().find(|vt| !kind.supports(**vt)) {
            return Err(FilterError::Configuration(format!(
                "operator `{symbol}` has no {unsupported} semantics"
            )));
        }

        Ok(Self {
            kind,
            symbol: symbol.to_string(),
            label: label.into(),
            applicable_types: applicable_types.to_vec(),
        })
    }

    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    pub fn applies_to(&self, value_type: ValueType) -> bool {
        self.applicable_types.contains(&value_type)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
    enum_values: HashMap<String, Vec<String>>,
}

impl PropertyCatalog {
    pub fn new(properties: Vec<Property>) -> FilterResult<Self> {
        let mut seen = HashSet::new();
        for property in &properties {
            if !seen.insert(property.key.as_str()) {
                return Err(FilterError::Configuration(format!(
                    "duplicate property key `{}`",
                    property.key
                )));
            }
        }

        Ok(Self {
            properties,
            enum_values: HashMap::new(),
        })
    }

    pub fn with_enum_values(mut self, key: &str, values: &[&str]) -> FilterResult<Self> {
        match self.property(key) {
            Some(property) if property.value_type == ValueType::Enum => {}
            Some(property) => {
                return Err(FilterError::Configuration(format!(
                    "enum values declared for {} property `{key}`",
                    property.value_type
                )))
            }
            None => {
                return Err(FilterError::Configuration(format!(
                    "enum values declared for unknown property `{key}`"
                )))
            }
        }

        self.enum_values
            .entry(key.to_string())
            .or_default()
            .extend(values.iter().map(|value| value.to_string()));
        Ok(self)
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.key == key)
    }

    pub fn find(&self, name: &str) -> Option<&Property> {
        let name = name.trim();
        self.properties.iter().find(|property| {
            property.key.eq_ignore_ascii_case(name) || property.label.eq_ignore_ascii_case(name)
        })
    }

    pub fn properties_matching(&self, query: &str) -> Vec<&Property> {
        let needle = query.to_lowercase();
        self.properties
            .iter()
            .filter(|property| property.label.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn enum_values_for(&self, key: &str) -> Vec<&str> {
        match self.property(key) {
            Some(property) if property.value_type == ValueType::Enum => self
                .enum_values
                .get(key)
                .map(|values| values.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OperatorRegistry {
    operators: Vec<Operator>,
}

impl OperatorRegistry {
    pub fn new(operators: Vec<Operator>) -> FilterResult<Self> {
        let mut seen = HashSet::new();
        for operator in &operators {
            if !seen.insert(operator.kind) {
                return Err(FilterError::Configuration(format!(
                    "duplicate operator `{}`",
                    operator.symbol
                )));
            }
        }
        Ok(Self { operators })
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, symbol: &str) -> Option<&Operator> {
        self.operators
            .iter()
            .find(|operator| operator.symbol == symbol)
    }

    pub fn operators_for(&self, value_type: ValueType) -> FilterResult<Vec<&Operator>> {
        let operators: Vec<&Operator> = self
            .operators
            .iter()
            .filter(|operator| operator.applies_to(value_type))
            .collect();

        if operators.is_empty() {
            return Err(FilterError::Configuration(format!(
                "no operator applies to {value_type} properties"
            )));
        }
        Ok(operators)
    }
}

#[derive(Clone, Debug)]
pub struct FilterCatalog {
    properties: PropertyCatalog,
    operators: OperatorRegistry,
}

impl FilterCatalog {
    pub fn new(properties: PropertyCatalog, operators: OperatorRegistry) -> FilterResult<Self> {
        for property in properties.properties() {
            if let Err(FilterError::Configuration(reason)) =
                operators.operators_for(property.value_type)
            {
                return Err(FilterError::Configuration(format!(
                    "property `{}` is unusable: {reason}",
                    property.key
                )));
            }
        }

        tracing::debug!(
            properties = properties.properties().len(),
            operators = operators.operators().len(),
            "filter catalog ready"
        );

        Ok(Self {
            properties,
            operators,
        })
    }

    pub fn query_insights() -> FilterResult<Self> {
        let properties = PropertyCatalog::new(vec![
            Property::new(FIELD_QUERY_TYPE, "Query Type", ValueType::Enum),
            Property::new(FIELD_SEARCH_TYPE, "Search Type", ValueType::Enum),
            Property::new(FIELD_NODE, "Node", ValueType::Enum),
            Property::new(FIELD_INDEX, "Index", ValueType::Enum),
            Property::new(FIELD_WLM_GROUP, "WLM Group", ValueType::Enum),
            Property::new(FIELD_LATENCY, "Latency", ValueType::Number),
            Property::new(FIELD_CPU, "CPU", ValueType::Number),
            Property::new(FIELD_MEMORY, "Memory", ValueType::Number),
            Property::new(FIELD_TIMESTAMP, "Date and Time", ValueType::Date),
        ])?
        .with_enum_values(FIELD_QUERY_TYPE, &["Group", "Search", "Aggregation", "Match"])?
        .with_enum_values(
            FIELD_SEARCH_TYPE,
            &["DFS", "Query Then Fetch", "Query And Fetch"],
        )?
        .with_enum_values(FIELD_NODE, &["node1", "node2", "node3"])?
        .with_enum_values(FIELD_INDEX, &["index1", "index2", "index3"])?
        .with_enum_values(FIELD_WLM_GROUP, &["group1", "group2", "group3"])?;

        let operators = OperatorRegistry::new(vec![
            Operator::new("=", "Equals", &ALL_TYPES)?,
            Operator::new("!=", "Does not equal", &ALL_TYPES)?,
            Operator::new(":", "Contains", &TEXT_TYPES)?,
            Operator::new("!:", "Does not contain", &TEXT_TYPES)?,
            Operator::new("^", "Starts with", &TEXT_TYPES)?,
            Operator::new("!^", "Does not start with", &TEXT_TYPES)?,
            Operator::new(">", "Greater than", &ORDERED_TYPES)?,
            Operator::new("<", "Less than", &ORDERED_TYPES)?,
            Operator::new(">=", "Greater than or equal", &ORDERED_TYPES)?,
            Operator::new("<=", "Less than or equal", &ORDERED_TYPES)?,
        ])?;

        Self::new(properties, operators)
    }

    pub fn properties(&self) -> &PropertyCatalog {
        &self.properties
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.property(key)
    }

    pub fn operator(&self, symbol: &str) -> Option<&Operator> {
        self.operators.operator(symbol)
    }

    pub fn properties_matching(&self, query: &str) -> Vec<&Property> {
        self.properties.properties_matching(query)
    }

    pub fn operators_for(&self, value_type: ValueType) -> FilterResult<Vec<&Operator>> {
        self.operators.operators_for(value_type)
    }

    pub fn enum_values_for(&self, key: &str) -> Vec<&str> {
        self.properties.enum_values_for(key)
    }
}
