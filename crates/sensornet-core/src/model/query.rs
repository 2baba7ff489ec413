// ── Query Parameter Model ──
//
// Immutable description of a requested data page. Every update returns a
// new `QueryParams` inside a `QueryUpdate`, which records whether the
// change pulled the page back to 1.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sort direction as sent to the server (`asc` / `desc`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// ── PageSize ─────────────────────────────────────────────────────────

/// Records per page. Never below [`PageSize::MIN`].
///
/// Every constructor clamps, so a value that violates the floor cannot
/// exist and therefore cannot reach the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const MIN: Self = Self(10);

    /// Clamp `n` up to the floor.
    pub fn new(n: u32) -> Self {
        Self(n.max(Self::MIN.0))
    }

    /// Interpret free-text input from a page-size box.
    ///
    /// Leading whitespace and zeros are ignored and parsing stops at the
    /// first non-digit. Input with no leading digits clamps to the floor,
    /// as does anything below it.
    pub fn parse(input: &str) -> Self {
        let digits: String = input
            .trim()
            .trim_start_matches('0')
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return Self::MIN;
        }
        // Digit-only strings fail to parse only on overflow.
        Self::new(digits.parse().unwrap_or(u32::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u32> for PageSize {
    fn from(n: u32) -> Self {
        Self::new(n)
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── QueryParams ──────────────────────────────────────────────────────

/// Filters, sort, search, and paging for one list request.
///
/// Search and sort/filter are mutually exclusive data sources: while the
/// search term is non-empty the search endpoint is used, and the sort and
/// filter values are kept untouched so clearing the term restores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    filters: BTreeMap<String, String>,
    sort_field: String,
    sort_direction: SortDirection,
    search_term: String,
    search_field: String,
    page: u32,
    page_size: PageSize,
}

/// Result of a [`QueryParams`] update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryUpdate {
    pub params: QueryParams,
    /// The update moved the page back to 1.
    pub page_reset: bool,
}

impl QueryParams {
    /// Page 1, minimum page size, no filters, no search.
    pub fn new(
        sort_field: impl Into<String>,
        sort_direction: SortDirection,
        search_field: impl Into<String>,
    ) -> Self {
        Self {
            filters: BTreeMap::new(),
            sort_field: sort_field.into(),
            sort_direction,
            search_term: String::new(),
            search_field: search_field.into(),
            page: 1,
            page_size: PageSize::MIN,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn filter(&self, field: &str) -> Option<&str> {
        self.filters.get(field).map(String::as_str)
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn search_field(&self) -> &str {
        &self.search_field
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Whether records come from the search endpoint.
    pub fn is_search(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    // ── Updates ──────────────────────────────────────────────────────

    /// Set or (with an empty value) remove a filter.
    pub fn with_filter(&self, field: impl Into<String>, value: impl Into<String>) -> QueryUpdate {
        let mut next = self.clone();
        let (field, value) = (field.into(), value.into());
        if value.is_empty() {
            next.filters.remove(&field);
        } else {
            next.filters.insert(field, value);
        }
        next.reset_page()
    }

    pub fn with_sort(&self, field: impl Into<String>, direction: SortDirection) -> QueryUpdate {
        let mut next = self.clone();
        next.sort_field = field.into();
        next.sort_direction = direction;
        next.reset_page()
    }

    pub fn with_search(&self, term: impl Into<String>, field: impl Into<String>) -> QueryUpdate {
        let mut next = self.clone();
        next.search_term = term.into();
        next.search_field = field.into();
        next.reset_page()
    }

    /// Change only the search term, keeping the search field.
    pub fn with_search_term(&self, term: impl Into<String>) -> QueryUpdate {
        let field = self.search_field.clone();
        self.with_search(term, field)
    }

    /// Change the search field. The term is cleared, which reverts to the
    /// sort/filter source.
    pub fn with_search_field(&self, field: impl Into<String>) -> QueryUpdate {
        self.with_search(String::new(), field)
    }

    /// Drop the search term and every filter. Sort is kept.
    pub fn cleared(&self) -> QueryUpdate {
        let mut next = self.clone();
        next.filters.clear();
        next.search_term.clear();
        next.reset_page()
    }

    /// Jump to page `n` (at least 1). The only update that keeps the page.
    pub fn with_page(&self, n: u32) -> QueryUpdate {
        let mut next = self.clone();
        next.page = n.max(1);
        QueryUpdate {
            params: next,
            page_reset: false,
        }
    }

    pub fn with_page_size(&self, size: PageSize) -> QueryUpdate {
        let mut next = self.clone();
        next.page_size = size;
        next.reset_page()
    }

    /// Page-size change from raw text, clamped via [`PageSize::parse`].
    pub fn with_page_size_input(&self, input: &str) -> QueryUpdate {
        self.with_page_size(PageSize::parse(input))
    }

    /// Pull the page into `[1, total_pages]`. An empty result set keeps
    /// page 1.
    pub fn clamped_to(&self, total_pages: u32) -> Self {
        let mut next = self.clone();
        next.page = next.page.clamp(1, total_pages.max(1));
        next
    }

    fn reset_page(mut self) -> QueryUpdate {
        let page_reset = self.page != 1;
        self.page = 1;
        QueryUpdate {
            params: self,
            page_reset,
        }
    }
}
