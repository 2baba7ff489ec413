// ── Telemetry chart series ──

use std::sync::Arc;

use serde::Serialize;

use super::record::SensorRecord;

/// Lowest top value of the light axis.
const LIGHT_AXIS_FLOOR: f64 = 100.0;

/// The recent samples plotted on the dashboard chart, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub samples: Arc<Vec<SensorRecord>>,
}

impl ChartSeries {
    pub fn new(samples: Vec<SensorRecord>) -> Self {
        Self {
            samples: Arc::new(samples),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Top of the light axis: the largest reading rounded up to a multiple
    /// of ten plus ten of headroom, never below 100.
    pub fn light_axis_max(&self) -> f64 {
        let peak = self
            .samples
            .iter()
            .map(|s| s.light)
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if peak.is_finite() {
            ((peak / 10.0).ceil() * 10.0 + 10.0).max(LIGHT_AXIS_FLOOR)
        } else {
            LIGHT_AXIS_FLOOR
        }
    }

    /// Latest sample, if any.
    pub fn latest(&self) -> Option<&SensorRecord> {
        self.samples.last()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn with_light(values: &[f64]) -> ChartSeries {
        let samples = values
            .iter()
            .zip(1..)
            .map(|(&light, id)| SensorRecord {
                id,
                temperature: 25.0,
                humidity: 50.0,
                light,
                time: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
            })
            .collect();
        ChartSeries::new(samples)
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn light_axis_has_floor_and_headroom() {
        assert_eq!(with_light(&[]).light_axis_max(), 100.0);
        assert_eq!(with_light(&[12.0, 40.0]).light_axis_max(), 100.0);
        assert_eq!(with_light(&[340.0]).light_axis_max(), 350.0);
        assert_eq!(with_light(&[341.2, 20.0]).light_axis_max(), 360.0);
    }

    #[test]
    fn latest_is_last_sample() {
        let series = with_light(&[1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.latest().map(|s| s.id), Some(3));
    }
}
