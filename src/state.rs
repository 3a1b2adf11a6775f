// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Query list session: one user's rows, filter tokens, free-text search and paging position.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::domain::value::Row;
use crate::error::FilterResult;
use crate::filter::builder::TokenBuilder;
use crate::filter::catalog::FilterCatalog;
use crate::filter::evaluator::filter_rows;
use crate::filter::paginator::{PageSize, PageSummary, Paginator};
use crate::insights::summary::{dashboard_summaries, MetricSummary};
use crate::repository::QueryRepositoryHandle;

pub struct QueryListSession {
    rows: Vec<Row>,
    builder: TokenBuilder,
    paginator: Paginator,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueryListView {
    pub match_count: usize,
    pub match_label: String,
    pub search_text: String,
    pub tokens: Vec<String>,
    pub rows: Vec<Row>,
    pub page: PageSummary,
}

impl QueryListSession {
    pub fn new(catalog: Arc<FilterCatalog>, rows: Vec<Row>, page_size: PageSize) -> Self {
        Self {
            rows,
            builder: TokenBuilder::new(catalog),
            paginator: Paginator::new(page_size),
        }
    }

    pub fn load(
        catalog: Arc<FilterCatalog>,
        source: &QueryRepositoryHandle,
        page_size: PageSize,
    ) -> Result<Self> {
        let rows = source.load()?;
        tracing::info!(source = source.source_name(), rows = rows.len(), "query rows loaded");
        Ok(Self::new(catalog, rows, page_size))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn builder(&self) -> &TokenBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut TokenBuilder {
        &mut self.builder
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn apply_expression(&mut self, text: &str) -> FilterResult<()> {
        self.builder.apply_expression(text).map(|_| ())
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.builder.set_search_text(text);
    }

    pub fn clear_filters(&mut self) {
        self.builder.clear_all();
    }

    pub fn filtered(&self) -> Vec<&Row> {
        filter_rows(
            &self.rows,
            self.builder.tokens(),
            self.builder.search_text(),
        )
    }

    pub fn next_page(&mut self) {
        let count = self.filtered().len();
        self.paginator.next(count);
    }

    pub fn previous_page(&mut self) {
        let count = self.filtered().len();
        self.paginator.previous(count);
    }

    pub fn go_to_page(&mut self, page_index: usize) {
        let count = self.filtered().len();
        self.paginator.go_to(page_index, count);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.paginator.set_page_size(page_size);
    }

    pub fn view(&self) -> QueryListView {
        let matched = self.filtered();
        let count = matched.len();

        QueryListView {
            match_count: count,
            match_label: match_label(count),
            search_text: self.builder.search_text().to_string(),
            tokens: self
                .builder
                .tokens()
                .iter()
                .map(ToString::to_string)
                .collect(),
            rows: self
                .paginator
                .page(&matched)
                .iter()
                .map(|row| (*row).clone())
                .collect(),
            page: self.paginator.summary(count),
        }
    }

    pub fn summaries(&self) -> Vec<MetricSummary> {
        let matched = self.filtered();
        dashboard_summaries(matched.iter().copied())
    }
}

fn match_label(count: usize) -> String {
    if count == 1 {
        "1 match".to_string()
    } else {
        format!("{count} matches")
    }
}
