// Query Insights is open-source under the Apache License 2.0; see LICENSE for usage and contributions.
// Paging over filtered results. Indices are clamped, never rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [Self::Ten, Self::TwentyFive, Self::Fifty];

    pub fn get(&self) -> usize {
        match self {
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = FilterError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(FilterError::InvalidPageSize(value))
    }
}

impl From<PageSize> for usize {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per page", self.get())
    }
}

/// Displayed page count: an empty result still shows one (empty) page.
pub fn total_pages(count: usize, page_size: PageSize) -> usize {
    count.div_ceil(page_size.get()).max(1)
}

pub fn page<T>(items: &[T], page_index: usize, page_size: PageSize) -> &[T] {
    let last = total_pages(items.len(), page_size) - 1;
    let start = page_index.min(last) * page_size.get();
    let end = (start + page_size.get()).min(items.len());
    &items[start.min(items.len())..end]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub page_index: usize,
    pub total_pages: usize,
    pub first_item: usize,
    pub last_item: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} (page {} of {})",
            self.first_item,
            self.last_item,
            self.total_items,
            self.page_index + 1,
            self.total_pages
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Paginator {
    page_index: usize,
    page_size: PageSize,
}

impl Paginator {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_index: 0,
            page_size,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.page_index = 0;
    }

    pub fn go_to(&mut self, page_index: usize, count: usize) {
        self.page_index = page_index.min(total_pages(count, self.page_size) - 1);
    }

    pub fn next(&mut self, count: usize) {
        self.go_to(self.page_index.saturating_add(1), count);
    }

    /// Steps back from the page on screen, not from a stale requested index.
    pub fn previous(&mut self, count: usize) {
        self.page_index = self.current_index(count).saturating_sub(1);
    }

    pub fn total_pages(&self, count: usize) -> usize {
        total_pages(count, self.page_size)
    }

    pub fn current_index(&self, count: usize) -> usize {
        self.page_index.min(self.total_pages(count) - 1)
    }

    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page(items, self.page_index, self.page_size)
    }

    pub fn summary(&self, count: usize) -> PageSummary {
        let page_index = self.current_index(count);
        let start = page_index * self.page_size.get();
        let last_item = (start + self.page_size.get()).min(count);
        PageSummary {
            page_index,
            total_pages: self.total_pages(count),
            first_item: if count == 0 { 0 } else { start + 1 },
            last_item,
            total_items: count,
            page_size: self.page_size.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    #[test]
    fn page_size_accepts_only_dashboard_sizes() {
        assert_eq!(PageSize::try_from(25), Ok(PageSize::TwentyFive));
        assert_eq!(PageSize::try_from(20), Err(FilterError::InvalidPageSize(20)));
        assert_eq!(PageSize::Fifty.to_string(), "50 per page");
    }

    #[test]
    fn total_pages_never_drops_below_one() {
        assert_eq!(total_pages(0, PageSize::Ten), 1);
        assert_eq!(total_pages(10, PageSize::Ten), 1);
        assert_eq!(total_pages(11, PageSize::Ten), 2);
        assert_eq!(total_pages(50, PageSize::TwentyFive), 2);
    }

    #[test]
    fn page_slices_and_clamps() {
        let data = numbers(23);
        assert_eq!(page(&data, 0, PageSize::Ten), &data[0..10]);
        assert_eq!(page(&data, 2, PageSize::Ten), &data[20..23]);

        let pages = total_pages(data.len(), PageSize::Ten);
        assert_eq!(page(&data, pages, PageSize::Ten), &data[20..23]);
        assert_eq!(page(&data, usize::MAX, PageSize::Ten), &data[20..23]);

        let empty: Vec<usize> = Vec::new();
        assert!(page(&empty, 3, PageSize::Ten).is_empty());
    }

    #[test]
    fn navigation_saturates() {
        let mut paginator = Paginator::new(PageSize::Ten);
        paginator.previous(35);
        assert_eq!(paginator.page_index(), 0);

        for _ in 0..10 {
            paginator.next(35);
        }
        assert_eq!(paginator.page_index(), 3);

        paginator.previous(35);
        assert_eq!(paginator.page_index(), 2);
    }

    #[test]
    fn previous_steps_back_from_the_clamped_page() {
        let mut paginator = Paginator::new(PageSize::Ten);
        paginator.go_to(4, 50);

        paginator.previous(15);
        assert_eq!(paginator.page_index(), 0);
        assert_eq!(paginator.summary(15).page_index, 0);
    }

    #[test]
    fn changing_page_size_resets_index() {
        let mut paginator = Paginator::new(PageSize::Ten);
        paginator.go_to(4, 100);
        assert_eq!(paginator.page_index(), 4);

        paginator.set_page_size(PageSize::TwentyFive);
        assert_eq!(paginator.page_index(), 0);
        assert_eq!(paginator.page_size(), PageSize::TwentyFive);
    }

    #[test]
    fn summary_reports_visible_range() {
        let mut paginator = Paginator::new(PageSize::Ten);
        paginator.go_to(2, 23);
        let summary = paginator.summary(23);
        assert_eq!((summary.first_item, summary.last_item), (21, 23));
        assert_eq!(summary.to_string(), "Showing 21 to 23 of 23 (page 3 of 3)");

        // The result set shrank under a stale index.
        let summary = paginator.summary(4);
        assert_eq!(summary.page_index, 0);
        assert_eq!((summary.first_item, summary.last_item), (1, 4));

        let summary = paginator.summary(0);
        assert_eq!((summary.first_item, summary.last_item), (0, 0));
        assert_eq!(summary.total_pages, 1);
    }
}
