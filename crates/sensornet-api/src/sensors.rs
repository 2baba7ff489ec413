// Telemetry endpoints
//
// Sorted/filtered listing, free-text search, scoped counts, and the
// latest-reading and chart snapshots polled by the dashboard.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CountRequest, LatestReading, PageCount, PageRequest, SensorSample, SensorScope};

impl ApiClient {
    /// Fetch one page of telemetry from the endpoint matching the scope.
    ///
    /// `POST /api/datasensor/sort/` for [`SensorScope::Sorted`],
    /// `POST /api/datasensor/search/` for [`SensorScope::Search`].
    pub async fn list_sensor_data(
        &self,
        req: &PageRequest<SensorScope>,
    ) -> Result<Vec<SensorSample>, Error> {
        let path = match req.scope {
            SensorScope::Sorted { .. } => "datasensor/sort/",
            SensorScope::Search { .. } => "datasensor/search/",
        };
        debug!(path, page = req.page, page_size = req.page_size, "listing telemetry");
        self.post(self.api_url(path)?, req).await
    }

    /// Count telemetry rows for a scope.
    ///
    /// `POST /api/datasensor/count/`
    pub async fn count_sensor_data(
        &self,
        req: &CountRequest<SensorScope>,
    ) -> Result<PageCount, Error> {
        self.post(self.api_url("datasensor/count/")?, req).await
    }

    /// Most recent telemetry reading.
    ///
    /// `GET /api/datasensor/latest/`
    pub async fn latest_sensor(&self) -> Result<LatestReading, Error> {
        self.get(self.api_url("datasensor/latest/")?).await
    }

    /// The last 20 samples, oldest first.
    ///
    /// `GET /api/datasensor/chartlatest/`
    pub async fn chart_latest(&self) -> Result<Vec<SensorSample>, Error> {
        self.get(self.api_url("datasensor/chartlatest/")?).await
    }
}
