// ── Domain model ──
//
// Strictly typed views of the dashboard's data. The wire types in
// `sensornet_api::models` are converted into these in `crate::convert`.

pub mod chart;
pub mod device;
pub mod page;
pub mod profile;
pub mod query;
pub mod record;

pub use chart::ChartSeries;
pub use device::{Action, DeviceCommand, DeviceId, DevicePhase, DeviceState};
pub use page::{PageTotals, ResultPage, total_pages};
pub use profile::{OperatorProfile, ProfileField};
pub use query::{PageSize, QueryParams, QueryUpdate, SortDirection};
pub use record::{ActionRecord, Record, SensorRecord, TelemetryReading};
