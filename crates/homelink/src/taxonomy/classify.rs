//! Derives a device's canonical label and dashboard eligibility from the raw
//! record the backend returned. Classification never fails: anything that does
//! not resolve degrades to the "Other" sentinel.

use super::registry::registry;
use super::registry::OTHER_LABEL;
use crate::directory::Device;

/// Canonical label for a device.
///
/// The resolution cascade, each step an optional-returning lookup so the
/// precedence levels stay independently testable:
///   1. the explicit single-label override, when present and resolvable
///   2. the first entry of the raw label list
///   3. the raw label-category field
///   4. the "Other" sentinel
pub fn primary_label(device: &Device) -> String {
    from_label_override(device)
        .or_else(|| from_raw_labels(device))
        .or_else(|| from_category_field(device))
        .unwrap_or(OTHER_LABEL)
        .to_string()
}

fn from_label_override(device: &Device) -> Option<&'static str> {
    let raw = device.label.as_deref()?;
    registry().canonical(raw)
}

fn from_raw_labels(device: &Device) -> Option<&'static str> {
    let raw = device.labels.first()?;
    registry().canonical(raw)
}

fn from_category_field(device: &Device) -> Option<&'static str> {
    let raw = device.category.as_deref()?;
    registry().canonical(raw)
}

/// Whether a state string reads as telemetry rather than an actionable state.
///
/// True for "unavailable" (case-insensitive) and for plain decimal numbers.
/// Exponent notation, inf, and nan are not things hub firmwares put in a
/// display state, so they stay non-numeric here.
pub fn is_sensor_state(state: &str) -> bool {
    let trimmed = state.trim();
    if trimmed.eq_ignore_ascii_case("unavailable") {
        return true;
    }
    is_plain_decimal(trimmed)
}

fn is_plain_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
}

/// Whether a device earns a main dashboard tile.
///
/// Motion sensors are the carve-out: their tile shows detection state, so
/// primacy depends only on whether the current reading looks like telemetry.
pub fn is_primary(device: &Device) -> bool {
    let label = primary_label(device);
    if label == "Motion Sensor" {
        return !is_sensor_state(&device.state);
    }
    registry().is_primary(&label)
        && !registry().is_detail_only(&label)
        && !is_sensor_state(&device.state)
}

/// Label used for grouping devices in the UI.
///
/// Resolves to the canonical category name where possible; an unresolved raw
/// label is kept unchanged for display.
pub fn group_label(device: &Device) -> String {
    let raw = device
        .label
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| device.labels.first().map(String::as_str))
        .or(device.category.as_deref());

    match raw {
        Some(raw) => registry()
            .canonical(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
        None => OTHER_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_override_wins_over_raw_labels() {
        let mut device = Device::for_test("light.desk", "on", "Office", &["Shades"]);
        device.label = Some("Lamp".to_string());
        assert_eq!(primary_label(&device), "Light");
    }

    #[test]
    fn first_raw_label_wins_over_category_field() {
        let mut device = Device::for_test("cover.window", "open", "Office", &["Shades"]);
        device.category = Some("Light".to_string());
        assert_eq!(primary_label(&device), "Blind");
    }

    #[test]
    fn category_field_is_the_last_resolvable_step() {
        let mut device = Device::for_test("sensor.t", "21.5", "Office", &[]);
        device.category = Some("Temperature".to_string());
        assert_eq!(primary_label(&device), "Temperature Sensor");
    }

    #[test]
    fn unresolvable_records_degrade_to_other() {
        let device = Device::for_test("thing.x", "on", "Office", &["Flux Capacitor"]);
        assert_eq!(primary_label(&device), "Other");

        let bare = Device::for_test("thing.y", "on", "Office", &[]);
        assert_eq!(primary_label(&bare), "Other");
    }

    #[test]
    fn sensor_state_detection() {
        assert!(is_sensor_state("unavailable"));
        assert!(is_sensor_state(" Unavailable "));
        assert!(is_sensor_state("21.5"));
        assert!(is_sensor_state("-1"));
        assert!(is_sensor_state("+3.0"));

        assert!(!is_sensor_state("on"));
        assert!(!is_sensor_state("open"));
        assert!(!is_sensor_state(""));
        assert!(!is_sensor_state("1e5"));
        assert!(!is_sensor_state("nan"));
        assert!(!is_sensor_state("1.2.3"));
        assert!(!is_sensor_state("."));
    }

    #[test]
    fn numeric_states_are_not_primary() {
        let device = Device::for_test("light.dim", "42", "Office", &["Light"]);
        assert!(!is_primary(&device));

        let unavailable = Device::for_test("light.gone", "unavailable", "Office", &["Light"]);
        assert!(!is_primary(&unavailable));

        let on = Device::for_test("light.desk", "on", "Office", &["Light"]);
        assert!(is_primary(&on));
    }

    #[test]
    fn motion_sensor_carve_out_depends_only_on_state() {
        // Registry marks Motion Sensor as a sensor, which would normally
        // disqualify it; the carve-out keeps it while the reading is stateful.
        let active = Device::for_test("binary_sensor.hall", "on", "Hall", &["Motion"]);
        assert!(is_primary(&active));

        let unavailable =
            Device::for_test("binary_sensor.hall", "unavailable", "Hall", &["Motion"]);
        assert!(!is_primary(&unavailable));
    }

    #[test]
    fn detail_only_categories_never_get_tiles() {
        let camera = Device::for_test("camera.door", "idle", "Porch", &["Camera"]);
        assert!(!is_primary(&camera));
    }

    #[test]
    fn group_label_keeps_unresolved_raw_labels() {
        let device = Device::for_test("thing.x", "on", "Office", &["Workshop Gear"]);
        assert_eq!(group_label(&device), "Workshop Gear");

        let resolved = Device::for_test("cover.w", "open", "Office", &["Shades"]);
        assert_eq!(group_label(&resolved), "Blind");

        let bare = Device::for_test("thing.y", "on", "Office", &[]);
        assert_eq!(group_label(&bare), "Other");
    }
}
