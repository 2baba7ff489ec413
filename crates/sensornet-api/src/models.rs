// REST API request and response types
//
// Wire-level models for the dashboard server. Device ids, actions, and
// timestamps stay as strings here; `sensornet-core` converts them into
// strict domain types. Fields use `#[serde(default)]` where the server
// is known to omit them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Telemetry ────────────────────────────────────────────────────────

/// One telemetry row from the sort, search, or chart endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub time: String,
}

/// Latest telemetry readout from `datasensor/latest/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    #[serde(default)]
    pub time: Option<String>,
}

/// Which telemetry endpoint a request scopes to.
///
/// Sort and search are mutually exclusive data sources; the count endpoint
/// accepts either shape and scopes its totals the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorScope {
    Sorted {
        attribute: String,
        #[serde(rename = "type")]
        order: String,
    },
    Search {
        search: String,
        #[serde(rename = "type")]
        field: String,
    },
}

// ── Action history ───────────────────────────────────────────────────

/// One row of the actuator action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub id: i64,
    pub device: String,
    pub action: String,
    pub time: String,
}

/// Which action-log endpoint a request scopes to.
///
/// Empty `device` / `action` strings mean "any".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HistoryScope {
    Filter {
        device: String,
        action: String,
        attribute: String,
        #[serde(rename = "type")]
        order: String,
    },
    Search {
        time: String,
    },
}

// ── Shared paging envelopes ──────────────────────────────────────────

/// Body for the record endpoints: scope plus the requested page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRequest<S> {
    #[serde(flatten)]
    pub scope: S,
    pub page: u32,
    pub page_size: u32,
}

/// Body for the count endpoints: same scope, page size only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRequest<S> {
    #[serde(flatten)]
    pub scope: S,
    pub page_size: u32,
}

/// Count metadata for a scope at a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCount {
    #[serde(alias = "totalPages")]
    pub total_pages: u32,
    #[serde(alias = "totalCount")]
    pub total_count: u64,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Last recorded action per device id, e.g. `{"device1": "on"}`.
pub type LatestActions = HashMap<String, String>;

/// Acknowledgement from `device/`. Receipt only, not a state change.
///
/// The body shape varies between server versions, so it is kept raw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandAck(pub serde_json::Value);

/// A `{device, action}` event from the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub device: String,
    pub action: String,
}
