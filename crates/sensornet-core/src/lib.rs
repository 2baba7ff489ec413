//! Remote state synchronization engine for the sensornet dashboard.
//!
//! Sits between `sensornet-api` and UI consumers (the CLI):
//!
//! - **[`ListController`]**: Paginated, filterable, searchable list view.
//!   Parameter changes go through a [`Debouncer`] (free-text search waits
//!   for typing to pause, everything else dispatches at once). Every load
//!   carries a sequence number so out-of-order responses never overwrite
//!   newer results, and the current page is clamped when the result set
//!   shrinks.
//!
//! - **[`Reconciler`]**: Device on/off state without optimistic updates.
//!   A toggle only records an intent; the displayed state moves when the
//!   push channel confirms it.
//!
//! - **[`Dashboard`]**: Session facade: bootstraps device states, runs
//!   the reconciler against the push feed, polls the telemetry readout
//!   and chart, and vends list controllers for both views.
//!
//! - **[`StateStream<T>`]**: Subscription handle for published state.

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod list;
pub mod model;
pub mod persist;
pub mod reconcile;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DashboardConfig, ReconnectConfig, TlsMode, default_push_url};
pub use dashboard::{CommandOutcome, Dashboard, DeviceStates, PushFeed};
pub use dispatch::{Debouncer, Scheduled};
pub use error::CoreError;
pub use list::{
    HistorySource, ListController, ListSnapshot, PageEntry, PageSource, SensorSource,
    page_numbers,
};
pub use persist::{MemoryStore, Persisted, Persistence, ProfileEditor};
pub use reconcile::{Confirmation, Reconciler};
pub use stream::{StateStream, StateWatchStream};

// Transport handles, for consumers that talk to the server directly.
pub use sensornet_api::models::PushEvent;
pub use sensornet_api::{ApiClient, PushHandle, PushStatus};

pub use model::{
    Action, ActionRecord, ChartSeries, DeviceCommand, DeviceId, DevicePhase, DeviceState,
    OperatorProfile, PageSize, PageTotals, ProfileField, QueryParams, QueryUpdate, Record,
    ResultPage, SensorRecord, SortDirection, TelemetryReading, total_pages,
};
