//! Best-effort merge of cached per-entity travel-time overrides onto
//! motorized-cover devices.

use std::collections::HashMap;

use super::device::Device;

/// Entity domain used by motorized covers (blinds, curtains).
pub const COVER_DOMAIN: &str = "cover";

/// Entity ids of the devices that can carry a travel-time override.
pub fn cover_entity_ids(devices: &[Device]) -> Vec<String> {
    devices
        .iter()
        .filter(|device| device.domain() == COVER_DOMAIN)
        .map(|device| device.entity_id.clone())
        .collect()
}

/// Merge travel-time overrides onto a device list.
///
/// An override is applied only when the cached value is finite and strictly
/// positive; anything else leaves the device's prior value untouched. The
/// merge is idempotent and preserves list order.
pub fn apply_travel_overrides(
    devices: Vec<Device>,
    overrides: &HashMap<String, f64>,
) -> Vec<Device> {
    devices
        .into_iter()
        .map(|device| match overrides.get(&device.entity_id) {
            Some(&seconds) if seconds.is_finite() && seconds > 0.0 => {
                device.with_travel_seconds(seconds)
            }
            _ => device,
        })
        .collect()
}
