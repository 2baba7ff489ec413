// ── API-to-domain type conversions ──
//
// Bridges the loosely typed `sensornet_api::models` into the strict
// `crate::model` types. Timestamps are parsed and normalised to UTC;
// device ids and actions are parsed into enums. Rows that cannot be
// converted are dropped with a warning instead of failing a whole page.

use chrono::{DateTime, NaiveDateTime, Utc};

use sensornet_api::models::{
    ActionEntry, LatestActions, LatestReading, PageCount, PushEvent, SensorSample,
};

use crate::error::CoreError;
use crate::model::{
    Action, ActionRecord, DeviceCommand, DeviceId, PageTotals, SensorRecord, TelemetryReading,
};

// ── Helpers ────────────────────────────────────────────────────────

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a server timestamp.
///
/// Accepts RFC 3339 (any offset) or a naive `YYYY-MM-DD HH:MM:SS[.fff]`
/// which is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::Internal(format!("unrecognised timestamp '{raw}'")))
}

fn parse_action(raw: &str) -> Result<Action, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Internal(format!("unrecognised action '{raw}'")))
}

/// Convert a batch of rows, dropping (and logging) the ones that fail.
pub(crate) fn convert_rows<T, R>(rows: Vec<T>) -> Vec<R>
where
    R: TryFrom<T, Error = CoreError>,
{
    rows.into_iter()
        .filter_map(|row| match R::try_from(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unconvertible row");
                None
            }
        })
        .collect()
}

// ── Telemetry ──────────────────────────────────────────────────────

impl TryFrom<SensorSample> for SensorRecord {
    type Error = CoreError;

    fn try_from(s: SensorSample) -> Result<Self, Self::Error> {
        Ok(Self {
            id: s.id,
            temperature: s.temperature,
            humidity: s.humidity,
            light: s.light,
            time: parse_timestamp(&s.time)?,
        })
    }
}

impl From<LatestReading> for TelemetryReading {
    fn from(r: LatestReading) -> Self {
        Self {
            temperature: r.temperature,
            humidity: r.humidity,
            light: r.light,
            time: r.time.as_deref().and_then(|t| parse_timestamp(t).ok()),
        }
    }
}

// ── Action history ─────────────────────────────────────────────────

impl TryFrom<ActionEntry> for ActionRecord {
    type Error = CoreError;

    fn try_from(e: ActionEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: e.id,
            device: DeviceId::lookup(&e.device)?,
            action: parse_action(&e.action)?,
            time: parse_timestamp(&e.time)?,
        })
    }
}

impl From<PageCount> for PageTotals {
    fn from(c: PageCount) -> Self {
        Self {
            total_count: c.total_count,
            reported_pages: c.total_pages,
        }
    }
}

// ── Devices ────────────────────────────────────────────────────────

impl TryFrom<&PushEvent> for DeviceCommand {
    type Error = CoreError;

    fn try_from(e: &PushEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            device: DeviceId::lookup(&e.device)?,
            action: parse_action(&e.action)?,
        })
    }
}

/// Initial on/off state per device from the last-action snapshot.
///
/// Devices missing from the snapshot, or with an unparseable action,
/// start as off.
pub fn initial_states(latest: &LatestActions) -> Vec<(DeviceId, bool)> {
    DeviceId::all()
        .map(|device| {
            let on = latest
                .get(device.as_str())
                .and_then(|a| parse_action(a).ok())
                .is_some_and(Action::is_on);
            (device, on)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_naive_and_rfc3339_timestamps() {
        let naive = parse_timestamp("2025-08-30 10:15:00").unwrap();
        assert_eq!((naive.day(), naive.hour(), naive.minute()), (30, 10, 15));

        let offset = parse_timestamp("2025-08-30T17:15:00+07:00").unwrap();
        assert_eq!(offset, naive);

        let fractional = parse_timestamp("2025-08-30T10:15:00.250").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);

        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn action_entries_convert_with_aliases() {
        let record = ActionRecord::try_from(ActionEntry {
            id: 4,
            device: "device2".into(),
            action: "ON".into(),
            time: "2025-08-30 08:00:00".into(),
        })
        .unwrap();
        assert_eq!(record.device, DeviceId::Device2);
        assert_eq!(record.action, Action::On);
    }

    #[test]
    fn bad_rows_are_dropped() {
        let rows = vec![
            SensorSample {
                id: 1,
                temperature: 20.0,
                humidity: 50.0,
                light: 10.0,
                time: "2025-08-30 08:00:00".into(),
            },
            SensorSample {
                id: 2,
                temperature: 20.0,
                humidity: 50.0,
                light: 10.0,
                time: "garbage".into(),
            },
        ];
        let records: Vec<SensorRecord> = convert_rows(rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn push_events_parse_into_commands() {
        let cmd = DeviceCommand::try_from(&PushEvent {
            device: "device3".into(),
            action: "off".into(),
        })
        .unwrap();
        assert_eq!(cmd.device, DeviceId::Device3);
        assert_eq!(cmd.action, Action::Off);

        assert!(
            DeviceCommand::try_from(&PushEvent {
                device: "device9".into(),
                action: "on".into(),
            })
            .is_err()
        );
    }

    #[test]
    fn initial_states_default_to_off() {
        let latest = LatestActions::from([
            ("device1".to_owned(), "on".to_owned()),
            ("device3".to_owned(), "bogus".to_owned()),
        ]);
        assert_eq!(
            initial_states(&latest),
            vec![
                (DeviceId::Device1, true),
                (DeviceId::Device2, false),
                (DeviceId::Device3, false),
            ]
        );
    }
}
