//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use sensornet_core::{
    ApiClient, CoreError, DashboardConfig, ListController, ListSnapshot, PageEntry, PageSource,
    QueryParams, SortDirection,
};

use crate::cli::{Order, PageArgs};
use crate::error::CliError;

pub fn api_client(config: &DashboardConfig) -> Result<ApiClient, CliError> {
    ApiClient::new(config.base_url.clone(), &config.transport())
        .map_err(|e| CoreError::from(e).into())
}

impl From<Order> for SortDirection {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => SortDirection::Asc,
            Order::Desc => SortDirection::Desc,
        }
    }
}

/// Apply `--page-size` then `--page`. The page is applied last because
/// a size change resets to page 1.
pub fn apply_paging(params: QueryParams, paging: &PageArgs) -> QueryParams {
    let params = params.with_page_size_input(&paging.page_size).params;
    params.with_page(paging.page).params
}

/// Run one list view until it settles on a page.
///
/// A page past the end is clamped to the last page by the controller.
pub async fn load_page<S: PageSource>(
    source: S,
    params: QueryParams,
    config: &DashboardConfig,
) -> Result<ListSnapshot<S::Record>, CliError> {
    let list = ListController::spawn(
        source,
        params,
        config.search_debounce,
        CancellationToken::new(),
    );
    let snapshot = list.settled().await;
    list.shutdown();

    let snapshot = snapshot?;
    if let Some(err) = &snapshot.error {
        return Err(CoreError::clone(err).into());
    }
    Ok(snapshot)
}

/// JSON shape of one loaded page.
#[derive(Serialize)]
pub struct PageView<'a, R: Serialize> {
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub pages: Vec<PageEntry>,
    pub records: &'a [R],
}

impl<'a, R: Serialize + Clone> PageView<'a, R> {
    pub fn new(snapshot: &'a ListSnapshot<R>) -> Self {
        Self {
            page: snapshot.params.page(),
            page_size: snapshot.params.page_size().get(),
            total_count: snapshot.page.total_count,
            total_pages: snapshot.page.total_pages,
            pages: snapshot.page_numbers(),
            records: &snapshot.page.records,
        }
    }
}

/// `Page 2 of 3 (25 records)  1 [2] 3`
pub fn page_footer<R: Clone>(snapshot: &ListSnapshot<R>) -> String {
    let current = snapshot.params.page();
    let selector = snapshot
        .page_numbers()
        .iter()
        .map(|entry| match entry {
            PageEntry::Page(n) if *n == current => format!("[{n}]"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "Page {current} of {} ({} records)  {selector}",
        snapshot.page.total_pages.max(1),
        snapshot.page.total_count
    )
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn paging_applies_size_before_page() {
        let args = PageArgs {
            page: 3,
            page_size: "5".into(),
        };
        let params = apply_paging(QueryParams::new("time", SortDirection::Asc, "time"), &args);
        assert_eq!(params.page(), 3);
        assert_eq!(params.page_size().get(), 10);
    }
}
