// ── Realtime command/state reconciler ──
//
// Single writer of every `DeviceState`. A toggle records a pending intent
// and produces the command to send; `displayed` only moves when a push
// confirmation arrives. Command transport failures clear the intent and
// leave `displayed` alone.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::model::{Action, DeviceCommand, DeviceId, DeviceState};

/// What a push confirmation did to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Matched the pending intent; the device is idle again.
    Confirmed,
    /// Changed `displayed` without matching an intent (external change).
    /// Any pending intent is kept.
    Changed,
    /// Duplicate of the current state; nothing changed.
    Unchanged,
}

/// Per-device reconciliation state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciler {
    devices: BTreeMap<DeviceId, DeviceState>,
}

impl Reconciler {
    /// Start from a bootstrap snapshot. Devices not listed start off.
    pub fn new(initial: impl IntoIterator<Item = (DeviceId, bool)>) -> Self {
        let mut devices: BTreeMap<_, _> = DeviceId::all()
            .map(|id| (id, DeviceState::new(id, false)))
            .collect();
        for (id, on) in initial {
            devices.insert(id, DeviceState::new(id, on));
        }
        Self { devices }
    }

    pub fn state(&self, device: DeviceId) -> DeviceState {
        self.devices
            .get(&device)
            .copied()
            .unwrap_or_else(|| DeviceState::new(device, false))
    }

    /// All devices in id order.
    pub fn states(&self) -> Vec<DeviceState> {
        self.devices.values().copied().collect()
    }

    /// Record the intent to flip `device` and return the command to send.
    ///
    /// The desired state negates what is *displayed*, not any pending
    /// intent. A toggle while a command is outstanding overwrites the
    /// intent. `displayed` is not touched.
    pub fn begin_toggle(&mut self, device: DeviceId) -> DeviceCommand {
        let state = self.entry(device);
        let desired = !state.displayed;
        if let Some(previous) = state.pending_intent {
            debug!(%device, previous, desired, "toggle while command outstanding");
        }
        state.pending_intent = Some(desired);
        DeviceCommand {
            device,
            action: Action::from_on(desired),
        }
    }

    /// Apply an authoritative push confirmation.
    pub fn confirm(&mut self, event: DeviceCommand) -> Confirmation {
        let on = event.action.is_on();
        let state = self.entry(event.device);

        if state.pending_intent == Some(on) {
            state.displayed = on;
            state.pending_intent = None;
            return Confirmation::Confirmed;
        }
        if state.displayed == on {
            return Confirmation::Unchanged;
        }
        state.displayed = on;
        Confirmation::Changed
    }

    /// The command carrying `intent` for `device` failed in transport.
    ///
    /// Clears the intent if it is still the pending one (a newer toggle
    /// may have replaced it). Returns whether anything was cleared.
    pub fn command_failed(&mut self, device: DeviceId, intent: bool) -> bool {
        let state = self.entry(device);
        if state.pending_intent == Some(intent) {
            warn!(%device, intent, "device command failed, clearing intent");
            state.pending_intent = None;
            true
        } else {
            false
        }
    }

    fn entry(&mut self, device: DeviceId) -> &mut DeviceState {
        self.devices
            .entry(device)
            .or_insert_with(|| DeviceState::new(device, false))
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new([])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn push(device: DeviceId, action: Action) -> DeviceCommand {
        DeviceCommand { device, action }
    }

    #[test]
    fn toggle_does_not_change_displayed() {
        let mut r = Reconciler::default();
        let cmd = r.begin_toggle(DeviceId::Device1);

        assert_eq!(cmd, push(DeviceId::Device1, Action::On));
        let state = r.state(DeviceId::Device1);
        assert!(!state.displayed);
        assert_eq!(state.pending_intent, Some(true));
    }

    #[test]
    fn matching_push_confirms() {
        let mut r = Reconciler::default();
        r.begin_toggle(DeviceId::Device1);

        let outcome = r.confirm(push(DeviceId::Device1, Action::On));
        assert_eq!(outcome, Confirmation::Confirmed);
        let state = r.state(DeviceId::Device1);
        assert!(state.displayed);
        assert_eq!(state.pending_intent, None);
    }

    #[test]
    fn transport_failure_leaves_displayed_untouched() {
        let mut r = Reconciler::new([(DeviceId::Device2, true)]);
        let cmd = r.begin_toggle(DeviceId::Device2);
        assert_eq!(cmd.action, Action::Off);

        assert!(r.command_failed(DeviceId::Device2, false));
        assert_eq!(r.state(DeviceId::Device2), DeviceState::new(DeviceId::Device2, true));
    }

    #[test]
    fn duplicate_confirmation_is_a_no_op() {
        let mut r = Reconciler::new([(DeviceId::Device3, true)]);
        let before = r.clone();
        assert_eq!(
            r.confirm(push(DeviceId::Device3, Action::On)),
            Confirmation::Unchanged
        );
        assert_eq!(r, before);
    }

    #[test]
    fn toggle_negates_displayed_not_intent() {
        let mut r = Reconciler::default();
        let first = r.begin_toggle(DeviceId::Device1);
        let second = r.begin_toggle(DeviceId::Device1);
        assert_eq!(first, second);
        assert_eq!(r.state(DeviceId::Device1).pending_intent, Some(true));
    }

    #[test]
    fn off_event_while_waiting_for_on_keeps_intent() {
        let mut r = Reconciler::default();
        r.begin_toggle(DeviceId::Device1);
        // Display already shows off, so the event changes nothing.
        assert_eq!(
            r.confirm(push(DeviceId::Device1, Action::Off)),
            Confirmation::Unchanged
        );
        assert!(!r.state(DeviceId::Device1).displayed);
        assert_eq!(r.state(DeviceId::Device1).pending_intent, Some(true));
    }

    #[test]
    fn external_change_updates_idle_device() {
        let mut r = Reconciler::default();
        r.begin_toggle(DeviceId::Device1);

        assert_eq!(
            r.confirm(push(DeviceId::Device2, Action::On)),
            Confirmation::Changed
        );
        let other = r.state(DeviceId::Device2);
        assert!(other.displayed);
        assert_eq!(other.pending_intent, None);
        assert_eq!(r.state(DeviceId::Device1).pending_intent, Some(true));
    }

    #[test]
    fn stale_failure_does_not_clear_newer_intent() {
        let mut r = Reconciler::default();
        r.begin_toggle(DeviceId::Device1);
        r.confirm(push(DeviceId::Device1, Action::On));
        r.begin_toggle(DeviceId::Device1);

        // Failure report for the earlier "on" command.
        assert!(!r.command_failed(DeviceId::Device1, true));
        assert_eq!(r.state(DeviceId::Device1).pending_intent, Some(false));
    }

    #[test]
    fn devices_are_independent() {
        let mut r = Reconciler::default();
        r.begin_toggle(DeviceId::Device1);
        r.begin_toggle(DeviceId::Device3);
        r.command_failed(DeviceId::Device3, true);
        r.confirm(push(DeviceId::Device1, Action::On));

        let states = r.states();
        assert_eq!(states.len(), 3);
        assert!(states[0].displayed);
        assert!(!states[1].displayed);
        assert!(!states[2].displayed);
        assert!(states.iter().all(|s| s.pending_intent.is_none()));
    }
}
