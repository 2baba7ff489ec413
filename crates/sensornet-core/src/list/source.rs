// ── Page sources ──
//
// The fetch strategy a `ListController` is instantiated with. Each view
// maps `QueryParams` onto its own endpoints; records and counts for one
// load always share the same scope.

use std::future::Future;

use sensornet_api::ApiClient;
use sensornet_api::models::{CountRequest, HistoryScope, PageRequest, SensorScope};

use crate::convert::convert_rows;
use crate::error::CoreError;
use crate::model::{
    ActionRecord, PageTotals, QueryParams, Record, ResultPage, SensorRecord, SortDirection,
};

/// Fetch capability for one list view.
pub trait PageSource: Send + Sync + 'static {
    type Record: Record;

    /// Records for the page described by `params`.
    fn fetch_records(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Vec<Self::Record>, CoreError>> + Send;

    /// Totals for the scope of `params` at its page size.
    fn fetch_totals(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<PageTotals, CoreError>> + Send;

    /// Fetch records and totals concurrently and assemble a page. Fails
    /// if either request fails.
    fn fetch_page(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<ResultPage<Self::Record>, CoreError>> + Send {
        async move {
            let (records, totals) =
                tokio::try_join!(self.fetch_records(params), self.fetch_totals(params))?;
            Ok(ResultPage::new(records, totals, params.page_size()))
        }
    }
}

// ── Telemetry view ───────────────────────────────────────────────────

/// Sortable telemetry columns.
pub const SENSOR_SORT_FIELDS: [&str; 5] = ["id", "temperature", "humidity", "light", "time"];
/// Searchable telemetry columns.
pub const SENSOR_SEARCH_FIELDS: [&str; 4] = ["time", "temperature", "humidity", "light"];

/// Telemetry list: `datasensor/sort|search|count`.
#[derive(Debug, Clone)]
pub struct SensorSource {
    api: ApiClient,
}

impl SensorSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Default view: oldest first, searching by time.
    pub fn default_params() -> QueryParams {
        QueryParams::new("time", SortDirection::Asc, "time")
    }

    fn scope(params: &QueryParams) -> SensorScope {
        if params.is_search() {
            SensorScope::Search {
                search: params.search_term().trim().to_owned(),
                field: params.search_field().to_owned(),
            }
        } else {
            SensorScope::Sorted {
                attribute: params.sort_field().to_owned(),
                order: params.sort_direction().to_string(),
            }
        }
    }
}

impl PageSource for SensorSource {
    type Record = SensorRecord;

    async fn fetch_records(&self, params: &QueryParams) -> Result<Vec<SensorRecord>, CoreError> {
        let req = PageRequest {
            scope: Self::scope(params),
            page: params.page(),
            page_size: params.page_size().get(),
        };
        let rows = self.api.list_sensor_data(&req).await?;
        Ok(convert_rows(rows))
    }

    async fn fetch_totals(&self, params: &QueryParams) -> Result<PageTotals, CoreError> {
        let req = CountRequest {
            scope: Self::scope(params),
            page_size: params.page_size().get(),
        };
        Ok(self.api.count_sensor_data(&req).await?.into())
    }
}

// ── Action log view ──────────────────────────────────────────────────

/// Filter key for the device column.
pub const FILTER_DEVICE: &str = "device";
/// Filter key for the action column.
pub const FILTER_ACTION: &str = "action";

/// Action log: `historyaction/filter|search|count`.
#[derive(Debug, Clone)]
pub struct HistorySource {
    api: ApiClient,
}

impl HistorySource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Default view: newest first, searching by time.
    pub fn default_params() -> QueryParams {
        QueryParams::new("time", SortDirection::Desc, "time")
    }

    fn scope(params: &QueryParams) -> HistoryScope {
        if params.is_search() {
            HistoryScope::Search {
                time: params.search_term().trim().to_owned(),
            }
        } else {
            HistoryScope::Filter {
                device: params.filter(FILTER_DEVICE).unwrap_or_default().to_owned(),
                action: params.filter(FILTER_ACTION).unwrap_or_default().to_owned(),
                attribute: params.sort_field().to_owned(),
                order: params.sort_direction().to_string(),
            }
        }
    }
}

impl PageSource for HistorySource {
    type Record = ActionRecord;

    async fn fetch_records(&self, params: &QueryParams) -> Result<Vec<ActionRecord>, CoreError> {
        let req = PageRequest {
            scope: Self::scope(params),
            page: params.page(),
            page_size: params.page_size().get(),
        };
        let rows = self.api.list_history(&req).await?;
        Ok(convert_rows(rows))
    }

    async fn fetch_totals(&self, params: &QueryParams) -> Result<PageTotals, CoreError> {
        let req = CountRequest {
            scope: Self::scope(params),
            page_size: params.page_size().get(),
        };
        Ok(self.api.count_history(&req).await?.into())
    }
}
