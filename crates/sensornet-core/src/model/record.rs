// ── List records ──
//
// Rows shown by the list views. Immutable once received.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::device::{Action, DeviceId};

/// A list row with an identifying key and a timestamp.
pub trait Record: Clone + Send + Sync + 'static {
    fn key(&self) -> i64;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// One telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub id: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub time: DateTime<Utc>,
}

impl Record for SensorRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }
}

/// One entry of the actuator action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub id: i64,
    pub device: DeviceId,
    pub action: Action,
    pub time: DateTime<Utc>,
}

impl Record for ActionRecord {
    fn key(&self) -> i64 {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Latest telemetry readout for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReading {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub time: Option<DateTime<Utc>>,
}
