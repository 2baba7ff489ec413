// ── Actuator domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;

/// One of the three controlled devices.
///
/// Displays as the wire id (`device1`); parses the wire id or the
/// friendly alias (`aircon`, `light`, `fan`), case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum DeviceId {
    #[strum(to_string = "device1", serialize = "aircon")]
    Device1,
    #[strum(to_string = "device2", serialize = "light")]
    Device2,
    #[strum(to_string = "device3", serialize = "fan")]
    Device3,
}

impl DeviceId {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Wire id used by the REST and push endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device1 => "device1",
            Self::Device2 => "device2",
            Self::Device3 => "device3",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Self::Device1 => "aircon",
            Self::Device2 => "light",
            Self::Device3 => "fan",
        }
    }

    /// Parse a wire id or alias into a `DeviceId`.
    pub fn lookup(name: &str) -> Result<Self, CoreError> {
        name.trim().parse().map_err(|_| CoreError::UnknownDevice {
            name: name.to_owned(),
        })
    }
}

/// Actuator command / confirmed state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    On,
    Off,
}

impl Action {
    pub fn from_on(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

/// A `{device, action}` pair, either issued or confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceCommand {
    pub device: DeviceId,
    pub action: Action,
}

/// Reconciliation phase of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DevicePhase {
    /// No unconfirmed command outstanding.
    Idle,
    /// Command transmitted, waiting for the push confirmation.
    CommandSent,
}

/// What the dashboard knows about one device.
///
/// `displayed` is the only value a UI may render. It only changes on a
/// confirmed push event (or the bootstrap snapshot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    pub device: DeviceId,
    pub displayed: bool,
    /// Last desired state issued by the user and not yet confirmed.
    pub pending_intent: Option<bool>,
}

impl DeviceState {
    pub fn new(device: DeviceId, displayed: bool) -> Self {
        Self {
            device,
            displayed,
            pending_intent: None,
        }
    }

    pub fn phase(&self) -> DevicePhase {
        if self.pending_intent.is_some() {
            DevicePhase::CommandSent
        } else {
            DevicePhase::Idle
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_ids_parse_wire_names_and_aliases() {
        assert_eq!(DeviceId::lookup("device1").unwrap(), DeviceId::Device1);
        assert_eq!(DeviceId::lookup("Light").unwrap(), DeviceId::Device2);
        assert_eq!(DeviceId::lookup(" fan ").unwrap(), DeviceId::Device3);
        assert!(matches!(
            DeviceId::lookup("heater"),
            Err(CoreError::UnknownDevice { .. })
        ));
    }

    #[test]
    fn device_ids_display_as_wire_names() {
        assert_eq!(DeviceId::Device2.to_string(), "device2");
        assert_eq!(DeviceId::Device2.as_str(), "device2");
        assert_eq!(DeviceId::Device2.alias(), "light");
        assert_eq!(DeviceId::all().count(), 3);
    }

    #[test]
    fn device_ids_serialize_as_wire_names() {
        let json = serde_json::to_string(&DeviceId::Device3).unwrap();
        assert_eq!(json, "\"device3\"");
    }

    #[test]
    fn actions_round_trip_through_bool() {
        assert_eq!(Action::from_on(true), Action::On);
        assert!(!Action::Off.is_on());
        assert_eq!("OFF".parse::<Action>().unwrap(), Action::Off);
    }

    #[test]
    fn phase_follows_pending_intent() {
        let mut state = DeviceState::new(DeviceId::Device1, false);
        assert_eq!(state.phase(), DevicePhase::Idle);
        state.pending_intent = Some(true);
        assert_eq!(state.phase(), DevicePhase::CommandSent);
    }
}
