// Action history endpoints
//
// The actuator action log: device/action filtering, time search, scoped
// counts, and the last-action-per-device snapshot used at startup.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ActionEntry, CountRequest, HistoryScope, LatestActions, PageCount, PageRequest};

impl ApiClient {
    /// Fetch one page of the action log from the endpoint matching the scope.
    ///
    /// `POST /api/historyaction/filter/` or `POST /api/historyaction/search/`
    pub async fn list_history(
        &self,
        req: &PageRequest<HistoryScope>,
    ) -> Result<Vec<ActionEntry>, Error> {
        let path = match req.scope {
            HistoryScope::Filter { .. } => "historyaction/filter/",
            HistoryScope::Search { .. } => "historyaction/search/",
        };
        debug!(path, page = req.page, page_size = req.page_size, "listing action history");
        self.post(self.api_url(path)?, req).await
    }

    /// Count action-log rows for a scope.
    ///
    /// `POST /api/historyaction/count/`
    pub async fn count_history(
        &self,
        req: &CountRequest<HistoryScope>,
    ) -> Result<PageCount, Error> {
        self.post(self.api_url("historyaction/count/")?, req).await
    }

    /// Last recorded action for every device.
    ///
    /// `GET /api/historyaction/latest/`
    pub async fn latest_actions(&self) -> Result<LatestActions, Error> {
        self.get(self.api_url("historyaction/latest/")?).await
    }
}
