// ── Result pages ──

use serde::Serialize;

use super::query::PageSize;

/// Count metadata for one filter/search scope at one page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageTotals {
    pub total_count: u64,
    /// Page count as reported by the server. Informational only.
    pub reported_pages: u32,
}

/// One fetched page of records plus totals for its scope.
///
/// Replaced wholesale by every successful load, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage<R> {
    pub records: Vec<R>,
    pub total_count: u64,
    /// `ceil(total_count / page_size)`.
    pub total_pages: u32,
}

impl<R> ResultPage<R> {
    /// Build a page, deriving `total_pages` from the count.
    ///
    /// A server-reported page count that disagrees with the derived one is
    /// logged and ignored.
    pub fn new(records: Vec<R>, totals: PageTotals, page_size: PageSize) -> Self {
        let total_pages = total_pages(totals.total_count, page_size);
        if totals.reported_pages != total_pages {
            tracing::warn!(
                reported = totals.reported_pages,
                derived = total_pages,
                total_count = totals.total_count,
                page_size = page_size.get(),
                "server page count disagrees with total count"
            );
        }
        Self {
            records,
            total_count: totals.total_count,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> Default for ResultPage<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }
}

/// `ceil(total_count / page_size)`, saturating at `u32::MAX`.
pub fn total_pages(total_count: u64, page_size: PageSize) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.get()));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
