//! Static per-category capability table.
//!
//! Maps each canonical category to the actions a user may trigger and the
//! triggers the automation engine may match on. Categories without an entry
//! (and the "Other" sentinel) have no capabilities.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use strum::Display;

use super::classify;
use crate::directory::Device;

/// How an action is presented and invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    /// A plain press, no payload.
    Button,

    /// Sends a fixed value with the command.
    Fixed,

    /// Sends a user-chosen value within min/max.
    Slider,
}

/// A user-triggerable action for a category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActionSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ActionKind,

    /// Backend command invoked when the action fires.
    pub command: &'static str,

    /// Payload for `Fixed` actions.
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// How a trigger matches device changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TriggerKind {
    /// Fires when the device state becomes `to_state`.
    State,

    /// Fires when a numeric attribute changes.
    AttributeDelta,

    /// Fires on cover position changes.
    Position,
}

/// An automation-eligible trigger for a category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TriggerSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: TriggerKind,

    /// Target state for `State` triggers.
    pub to_state: Option<&'static str>,

    /// Watched attribute for `AttributeDelta` and `Position` triggers.
    pub attribute: Option<&'static str>,
}

/// Capability entry for one category.
#[derive(Debug)]
pub struct CapabilitySpec {
    pub category: &'static str,
    pub actions: &'static [ActionSpec],
    pub triggers: &'static [TriggerSpec],

    /// Devices of this category never appear in the automation builder.
    pub exclude_from_automations: bool,
}

const fn button(id: &'static str, label: &'static str, command: &'static str) -> ActionSpec {
    ActionSpec {
        id,
        label,
        kind: ActionKind::Button,
        command,
        value: None,
        min: None,
        max: None,
        step: None,
    }
}

const fn fixed(
    id: &'static str,
    label: &'static str,
    command: &'static str,
    value: f64,
) -> ActionSpec {
    ActionSpec {
        id,
        label,
        kind: ActionKind::Fixed,
        command,
        value: Some(value),
        min: None,
        max: None,
        step: None,
    }
}

const fn slider(
    id: &'static str,
    label: &'static str,
    command: &'static str,
    min: f64,
    max: f64,
    step: f64,
) -> ActionSpec {
    ActionSpec {
        id,
        label,
        kind: ActionKind::Slider,
        command,
        value: None,
        min: Some(min),
        max: Some(max),
        step: Some(step),
    }
}

const fn state_trigger(id: &'static str, label: &'static str, to_state: &'static str) -> TriggerSpec {
    TriggerSpec {
        id,
        label,
        kind: TriggerKind::State,
        to_state: Some(to_state),
        attribute: None,
    }
}

const fn delta_trigger(id: &'static str, label: &'static str, attribute: &'static str) -> TriggerSpec {
    TriggerSpec {
        id,
        label,
        kind: TriggerKind::AttributeDelta,
        to_state: None,
        attribute: Some(attribute),
    }
}

const fn position_trigger(id: &'static str, label: &'static str) -> TriggerSpec {
    TriggerSpec {
        id,
        label,
        kind: TriggerKind::Position,
        to_state: None,
        attribute: Some("current_position"),
    }
}

static CAPABILITIES: &[CapabilitySpec] = &[
    CapabilitySpec {
        category: "Light",
        actions: &[
            button("toggle", "Toggle", "light.toggle"),
            slider("brightness", "Brightness", "light.set_brightness", 0.0, 255.0, 1.0),
        ],
        triggers: &[
            state_trigger("turned_on", "Turned on", "on"),
            state_trigger("turned_off", "Turned off", "off"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Switch",
        actions: &[button("toggle", "Toggle", "switch.toggle")],
        triggers: &[
            state_trigger("turned_on", "Turned on", "on"),
            state_trigger("turned_off", "Turned off", "off"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Plug",
        actions: &[button("toggle", "Toggle", "switch.toggle")],
        triggers: &[
            state_trigger("turned_on", "Turned on", "on"),
            state_trigger("turned_off", "Turned off", "off"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Blind",
        actions: &[
            fixed("open", "Open", "cover.set_position", 100.0),
            fixed("close", "Close", "cover.set_position", 0.0),
            button("stop", "Stop", "cover.stop"),
            slider("position", "Position", "cover.set_position", 0.0, 100.0, 1.0),
        ],
        triggers: &[
            state_trigger("opened", "Opened", "open"),
            state_trigger("closed", "Closed", "closed"),
            position_trigger("position_changed", "Position changed"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Curtain",
        actions: &[
            fixed("open", "Open", "cover.set_position", 100.0),
            fixed("close", "Close", "cover.set_position", 0.0),
            slider("position", "Position", "cover.set_position", 0.0, 100.0, 1.0),
        ],
        triggers: &[
            state_trigger("opened", "Opened", "open"),
            state_trigger("closed", "Closed", "closed"),
            position_trigger("position_changed", "Position changed"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Thermostat",
        actions: &[slider(
            "target_temperature",
            "Target temperature",
            "climate.set_temperature",
            5.0,
            30.0,
            0.5,
        )],
        triggers: &[delta_trigger(
            "temperature_changed",
            "Temperature changed",
            "current_temperature",
        )],
        exclude_from_automations: false,
    },
    // Locks stay controllable but are kept out of the automation builder.
    CapabilitySpec {
        category: "Lock",
        actions: &[
            button("lock", "Lock", "lock.lock"),
            button("unlock", "Unlock", "lock.unlock"),
        ],
        triggers: &[
            state_trigger("locked", "Locked", "locked"),
            state_trigger("unlocked", "Unlocked", "unlocked"),
        ],
        exclude_from_automations: true,
    },
    CapabilitySpec {
        category: "Media Player",
        actions: &[
            button("play_pause", "Play / Pause", "media_player.play_pause"),
            slider("volume", "Volume", "media_player.set_volume", 0.0, 100.0, 1.0),
        ],
        triggers: &[state_trigger("started_playing", "Started playing", "playing")],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Motion Sensor",
        actions: &[],
        triggers: &[
            state_trigger("motion_detected", "Motion detected", "on"),
            state_trigger("motion_cleared", "Motion cleared", "off"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Door Sensor",
        actions: &[],
        triggers: &[
            state_trigger("opened", "Opened", "on"),
            state_trigger("closed", "Closed", "off"),
        ],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Temperature Sensor",
        actions: &[],
        triggers: &[delta_trigger("reading_changed", "Reading changed", "state")],
        exclude_from_automations: false,
    },
    CapabilitySpec {
        category: "Humidity Sensor",
        actions: &[],
        triggers: &[delta_trigger("reading_changed", "Reading changed", "state")],
        exclude_from_automations: false,
    },
];

static BY_CATEGORY: LazyLock<HashMap<&'static str, &'static CapabilitySpec>> =
    LazyLock::new(|| CAPABILITIES.iter().map(|spec| (spec.category, spec)).collect());

/// Capability entry for a canonical category name, if one is defined.
pub fn capability_for(category: &str) -> Option<&'static CapabilitySpec> {
    BY_CATEGORY.get(category).copied()
}

/// Actions for a category, empty when none are defined.
pub fn actions_for(category: &str) -> &'static [ActionSpec] {
    capability_for(category).map(|spec| spec.actions).unwrap_or(&[])
}

/// Triggers for a category, empty when none are defined.
pub fn triggers_for(category: &str) -> &'static [TriggerSpec] {
    capability_for(category).map(|spec| spec.triggers).unwrap_or(&[])
}

/// Filter a device list down to the ones the automation builder may offer.
///
/// A device is kept only if it is dashboard-eligible, its category has a
/// capability entry that is not excluded, and that entry carries at least one
/// action or trigger.
pub fn eligible_for_automation(devices: &[Device]) -> Vec<&Device> {
    devices
        .iter()
        .filter(|device| {
            if !classify::is_primary(device) {
                return false;
            }
            let Some(spec) = capability_for(&classify::primary_label(device)) else {
                return false;
            };
            !spec.exclude_from_automations
                && (!spec.actions.is_empty() || !spec.triggers.is_empty())
        })
        .collect()
}
