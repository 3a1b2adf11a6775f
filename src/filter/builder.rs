// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Three-step token builder: property, then operator, then value. Transitions on BuilderState are
// pure; TokenBuilder wraps them with the active token list and the free-text search box.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::value::ValueType;
use crate::error::{FilterError, FilterResult};

use super::catalog::{FilterCatalog, Operator, Property};
use super::token::{FilterExpression, FilterToken};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    SelectingProperty,
    SelectingOperator,
    SelectingValue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuilderState {
    step: Step,
    property: Option<Property>,
    operator: Option<Operator>,
    text_input: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Committed {
        state: BuilderState,
        token: FilterToken,
    },
    Pending(BuilderState),
}

impl BuilderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn property(&self) -> Option<&Property> {
        self.property.as_ref()
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    pub fn select_property(&self, property: Property) -> FilterResult<Self> {
        self.expect_step(Step::SelectingProperty, "select a property")?;
        Ok(Self {
            step: Step::SelectingOperator,
            property: Some(property),
            operator: None,
            text_input: String::new(),
        })
    }

    pub fn select_operator(&self, operator: Operator) -> FilterResult<Self> {
        self.expect_step(Step::SelectingOperator, "select an operator")?;
        let property = self.pending_property()?;
        if !operator.applies_to(property.value_type) {
            return Err(FilterError::InvalidTransition(format!(
                "operator `{}` does not apply to {} property `{}`",
                operator.symbol, property.value_type, property.key
            )));
        }

        Ok(Self {
            step: Step::SelectingValue,
            property: Some(property.clone()),
            operator: Some(operator),
            text_input: String::new(),
        })
    }

    pub fn with_text_input(&self, text: impl Into<String>) -> Self {
        Self {
            text_input: text.into(),
            ..self.clone()
        }
    }

    pub fn select_enum_value(&self, value: impl Into<String>) -> FilterResult<(Self, FilterToken)> {
        self.expect_step(Step::SelectingValue, "select a value")?;
        let (property, operator) = self.pending_clause()?;
        if property.value_type != ValueType::Enum {
            return Err(FilterError::InvalidTransition(format!(
                "{} property `{}` takes a typed value, not a listed one",
                property.value_type, property.key
            )));
        }

        let token = FilterToken::new(property.clone(), operator.clone(), value)?;
        Ok((Self::new(), token))
    }

    /// Blank text leaves the builder waiting for a value. The text is not parsed
    /// here; unparsable numbers and dates simply never match at evaluation.
    pub fn submit_free_text_value(&self, text: &str) -> FilterResult<Submission> {
        self.expect_step(Step::SelectingValue, "submit a value")?;
        let (property, operator) = self.pending_clause()?;
        if property.value_type == ValueType::Enum {
            return Err(FilterError::InvalidTransition(format!(
                "enum property `{}` takes one of its listed values",
                property.key
            )));
        }

        let value = text.trim();
        if value.is_empty() {
            return Ok(Submission::Pending(self.with_text_input(text)));
        }

        let token = FilterToken::new(property.clone(), operator.clone(), value)?;
        Ok(Submission::Committed {
            state: Self::new(),
            token,
        })
    }

    pub fn cancel(&self) -> Self {
        Self::new()
    }

    fn expect_step(&self, expected: Step, action: &str) -> FilterResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FilterError::InvalidTransition(format!(
                "cannot {action} while {:?}",
                self.step
            )))
        }
    }

    fn pending_property(&self) -> FilterResult<&Property> {
        self.property.as_ref().ok_or_else(|| {
            FilterError::InvalidTransition("no property has been selected".into())
        })
    }

    fn pending_clause(&self) -> FilterResult<(&Property, &Operator)> {
        let property = self.pending_property()?;
        let operator = self.operator.as_ref().ok_or_else(|| {
            FilterError::InvalidTransition("no operator has been selected".into())
        })?;
        Ok((property, operator))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyOption {
    pub key: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OperatorOption {
    pub symbol: String,
    pub label: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueOption {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BuilderOptions {
    Properties {
        items: Vec<PropertyOption>,
    },
    Operators {
        prompt: String,
        items: Vec<OperatorOption>,
    },
    Values {
        prompt: String,
        items: Vec<ValueOption>,
    },
    FreeText {
        prompt: String,
        hint: String,
        placeholder: String,
        can_apply: bool,
    },
}

pub struct TokenBuilder {
    catalog: Arc<FilterCatalog>,
    state: BuilderState,
    tokens: Vec<FilterToken>,
    search_text: String,
}

impl TokenBuilder {
    pub fn new(catalog: Arc<FilterCatalog>) -> Self {
        Self {
            catalog,
            state: BuilderState::new(),
            tokens: Vec::new(),
            search_text: String::new(),
        }
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn open(&mut self) {
        self.state = BuilderState::new();
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_text_input(&mut self, text: impl Into<String>) {
        self.state = self.state.with_text_input(text);
    }

    pub fn select_property(&mut self, key: &str) -> FilterResult<()> {
        let property = self
            .catalog
            .property(key)
            .cloned()
            .ok_or_else(|| FilterError::UnknownProperty(key.to_string()))?;

        self.state = self.state.select_property(property)?;
        self.search_text.clear();
        tracing::debug!(property = key, "property selected");
        Ok(())
    }

    pub fn select_operator(&mut self, symbol: &str) -> FilterResult<()> {
        let operator = self
            .catalog
            .operator(symbol)
            .cloned()
            .ok_or_else(|| FilterError::UnknownOperator(symbol.to_string()))?;

        self.state = self.state.select_operator(operator)?;
        tracing::debug!(operator = symbol, "operator selected");
        Ok(())
    }

    pub fn select_enum_value(&mut self, value: &str) -> FilterResult<&FilterToken> {
        let (state, token) = self.state.select_enum_value(value)?;
        Ok(self.commit(state, token))
    }

    pub fn submit_free_text_value(&mut self, text: &str) -> FilterResult<Option<&FilterToken>> {
        match self.state.submit_free_text_value(text)? {
            Submission::Committed { state, token } => Ok(Some(self.commit(state, token))),
            Submission::Pending(state) => {
                self.state = state;
                Ok(None)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = self.state.cancel();
    }

    pub fn remove_token(&mut self, index: usize) -> FilterResult<FilterToken> {
        if index >= self.tokens.len() {
            return Err(FilterError::IndexOutOfRange {
                index,
                len: self.tokens.len(),
            });
        }

        let removed = self.tokens.remove(index);
        tracing::debug!(token = %removed, index, "filter token removed");
        Ok(removed)
    }

    pub fn clear_all(&mut self) {
        self.tokens.clear();
        self.state = BuilderState::new();
        self.search_text.clear();
        tracing::debug!("filters cleared");
    }

    /// Runs the full property, operator, value flow for a textual filter. On
    /// failure the builder is left reset and no token is added.
    pub fn apply_expression(&mut self, text: &str) -> FilterResult<&FilterToken> {
        let expr = FilterExpression::parse(text, &self.catalog)?;
        let (key, symbol, value) = (
            expr.property.key.clone(),
            expr.operator.symbol.clone(),
            expr.value,
        );
        let value_type = expr.property.value_type;

        self.open();
        let search_text = std::mem::take(&mut self.search_text);
        let outcome = self.drive(&key, &symbol, &value, value_type);
        self.search_text = search_text;

        match outcome {
            Ok(()) => self
                .tokens
                .last()
                .ok_or_else(|| FilterError::InvalidExpression(text.to_string())),
            Err(err) => {
                tracing::warn!(expression = text, error = %err, "filter expression rejected");
                self.cancel();
                Err(err)
            }
        }
    }

    fn drive(&mut self, key: &str, symbol: &str, value: &str, value_type: ValueType) -> FilterResult<()> {
        self.select_property(key)?;
        self.select_operator(symbol)?;
        if value_type == ValueType::Enum {
            self.select_enum_value(value)?;
        } else if self.submit_free_text_value(value)?.is_none() {
            return Err(FilterError::InvalidExpression(value.to_string()));
        }
        Ok(())
    }

    pub fn options(&self) -> FilterResult<BuilderOptions> {
        match self.state.step() {
            Step::SelectingProperty => Ok(BuilderOptions::Properties {
                items: self
                    .catalog
                    .properties_matching(&self.search_text)
                    .into_iter()
                    .map(|property| PropertyOption {
                        key: property.key.clone(),
                        label: property.label.clone(),
                    })
                    .collect(),
            }),
            Step::SelectingOperator => {
                let property = self.state.pending_property()?;
                let items = self
                    .catalog
                    .operators_for(property.value_type)?
                    .into_iter()
                    .map(|operator| OperatorOption {
                        symbol: operator.symbol.clone(),
                        label: format!("{} {}", property.label, operator.symbol),
                        description: operator.label.clone(),
                    })
                    .collect();
                Ok(BuilderOptions::Operators {
                    prompt: format!("Use: \"{}\"", property.label),
                    items,
                })
            }
            Step::SelectingValue => {
                let (property, operator) = self.state.pending_clause()?;
                let prompt = format!("Use: \"{} {}\"", property.label, operator.symbol);
                match property.value_type {
                    ValueType::Enum => Ok(BuilderOptions::Values {
                        prompt,
                        items: self
                            .catalog
                            .enum_values_for(&property.key)
                            .into_iter()
                            .map(|value| ValueOption {
                                value: value.to_string(),
                                label: format!("{} {} {}", property.label, operator.symbol, value),
                            })
                            .collect(),
                    }),
                    ValueType::Number => Ok(BuilderOptions::FreeText {
                        prompt,
                        hint: "numeric value".into(),
                        placeholder: "100".into(),
                        can_apply: !self.state.text_input().trim().is_empty(),
                    }),
                    ValueType::Date => Ok(BuilderOptions::FreeText {
                        prompt,
                        hint: "date (YYYY-MM-DD)".into(),
                        placeholder: "2024-01-14".into(),
                        can_apply: !self.state.text_input().trim().is_empty(),
                    }),
                }
            }
        }
    }

    fn commit(&mut self, state: BuilderState, token: FilterToken) -> &FilterToken {
        tracing::debug!(token = %token, "filter token committed");
        self.state = state;
        self.search_text.clear();
        self.tokens.push(token);
        &self.tokens[self.tokens.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TokenBuilder {
        TokenBuilder::new(Arc::new(
            FilterCatalog::query_insights().expect("catalog"),
        ))
    }

    #[test]
    fn enum_flow_commits_and_resets() {
        let mut builder = builder();
        builder.set_search_text("no");
        builder.select_property("node").expect("property");
        assert_eq!(builder.state().step(), Step::SelectingOperator);
        assert!(builder.search_text().is_empty());

        builder.select_operator("=").expect("operator");
        assert_eq!(builder.state().step(), Step::SelectingValue);

        let token = builder.select_enum_value("node1").expect("value");
        assert_eq!(token.to_string(), "Node = node1");
        assert_eq!(builder.tokens().len(), 1);
        assert_eq!(builder.state(), &BuilderState::new());
    }

    #[test]
    fn free_text_flow_trims_and_ignores_blank_input() {
        let mut builder = builder();
        builder.select_property("latency").expect("property");
        builder.select_operator(">").expect("operator");

        assert!(builder.submit_free_text_value("   ").expect("blank").is_none());
        assert_eq!(builder.state().step(), Step::SelectingValue);
        assert!(builder.tokens().is_empty());

        let token = builder
            .submit_free_text_value("  500 ms ")
            .expect("submit")
            .expect("committed");
        assert_eq!(token.value(), "500 ms");
        assert_eq!(builder.state().step(), Step::SelectingProperty);
    }

    #[test]
    fn free_text_is_not_validated_at_commit() {
        let mut builder = builder();
        builder.select_property("timestamp").expect("property");
        builder.select_operator("=").expect("operator");
        let token = builder
            .submit_free_text_value("not a date")
            .expect("submit")
            .expect("committed");
        assert_eq!(token.value(), "not a date");
    }

    #[test]
    fn operator_must_match_property_type() {
        let mut builder = builder();
        builder.select_property("cpu").expect("property");

        let err = builder.select_operator(":").unwrap_err();
        assert!(matches!(err, FilterError::InvalidTransition(_)));
        assert_eq!(builder.state().step(), Step::SelectingOperator);
    }

    #[test]
    fn transitions_require_their_step() {
        let mut builder = builder();
        assert!(matches!(
            builder.select_operator("="),
            Err(FilterError::InvalidTransition(_))
        ));
        assert!(matches!(
            builder.select_enum_value("node1"),
            Err(FilterError::InvalidTransition(_))
        ));

        builder.select_property("node").expect("property");
        assert!(matches!(
            builder.select_property("index"),
            Err(FilterError::InvalidTransition(_))
        ));

        builder.select_operator("=").expect("operator");
        assert!(matches!(
            builder.submit_free_text_value("node1"),
            Err(FilterError::InvalidTransition(_))
        ));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut builder = builder();
        builder.select_property("memory").expect("property");
        builder.select_operator("<=").expect("operator");
        builder.set_text_input("512");

        builder.cancel();
        assert_eq!(builder.state(), &BuilderState::new());
        builder.cancel();
        assert_eq!(builder.state(), &BuilderState::new());
    }

    #[test]
    fn remove_token_round_trip_and_bounds() {
        let mut builder = builder();
        builder.apply_expression("cpu > 10").expect("first token");
        let before = builder.tokens().to_vec();

        builder.select_property("queryType").expect("property");
        builder.select_operator("=").expect("operator");
        builder.select_enum_value("Search").expect("value");
        let removed = builder.remove_token(1).expect("remove");
        assert_eq!(removed.value(), "Search");
        assert_eq!(builder.tokens(), before.as_slice());

        assert_eq!(
            builder.remove_token(5).unwrap_err(),
            FilterError::IndexOutOfRange { index: 5, len: 1 }
        );
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut builder = builder();
        builder.apply_expression("node = node2").expect("token");
        builder.set_search_text("index");
        builder.select_property("index").expect("property");

        builder.clear_all();
        assert!(builder.tokens().is_empty());
        assert!(builder.search_text().is_empty());
        assert_eq!(builder.state(), &BuilderState::new());
    }

    #[test]
    fn apply_expression_leaves_search_text_and_rolls_back_on_error() {
        let mut builder = builder();
        builder.set_search_text("q1");
        builder.apply_expression("memory >= 256").expect("token");
        assert_eq!(builder.search_text(), "q1");

        let err = builder.apply_expression("node > node1").unwrap_err();
        assert!(matches!(err, FilterError::InvalidTransition(_)));
        assert_eq!(builder.tokens().len(), 1);
        assert_eq!(builder.state(), &BuilderState::new());
    }

    #[test]
    fn options_follow_the_current_step() {
        let mut builder = builder();
        builder.set_search_text("type");
        let BuilderOptions::Properties { items } = builder.options().expect("options") else {
            panic!("expected property options");
        };
        assert_eq!(items.len(), 2);

        builder.select_property("searchType").expect("property");
        let BuilderOptions::Operators { prompt, items } = builder.options().expect("options")
        else {
            panic!("expected operator options");
        };
        assert_eq!(prompt, "Use: \"Search Type\"");
        assert_eq!(items[2].label, "Search Type :");
        assert_eq!(items[2].description, "Contains");

        builder.select_operator("^").expect("operator");
        let BuilderOptions::Values { items, .. } = builder.options().expect("options") else {
            panic!("expected value options");
        };
        assert_eq!(items[0].label, "Search Type ^ DFS");

        builder.cancel();
        builder.select_property("timestamp").expect("property");
        builder.select_operator(">").expect("operator");
        let BuilderOptions::FreeText {
            hint, can_apply, ..
        } = builder.options().expect("options")
        else {
            panic!("expected free text prompt");
        };
        assert_eq!(hint, "date (YYYY-MM-DD)");
        assert!(!can_apply);
    }
}
