use serde::Deserialize;
use serde::Serialize;

/// A device in the directory.
///
/// One instance per physical or virtual entity per assembly pass. A `Device`
/// is rebuilt fresh on every pass and never mutated in place; derived fields
/// and overrides are applied by constructing a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Stable primary key within a backend, `<domain>.<object_id>`.
    pub entity_id: String,

    /// Groups multiple entities under one physical device.
    #[serde(default)]
    pub device_id: String,

    pub name: String,

    /// Free-form state string: "on", "off", a numeric reading, "unavailable".
    pub state: String,

    /// Room or location; the access-control unit.
    #[serde(default)]
    pub area: String,

    /// Raw labels in backend order.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Explicit single-label override, highest classification precedence.
    #[serde(default)]
    pub label: Option<String>,

    /// Raw label-category field, lowest classification precedence.
    #[serde(default)]
    pub category: Option<String>,

    /// Canonical category name, derived locally during assembly.
    #[serde(default)]
    pub canonical_label: Option<String>,

    /// Opaque attribute bag as received from the backend.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    /// Travel time for motorized covers, possibly overridden per entity.
    #[serde(default)]
    pub blind_travel_seconds: Option<f64>,
}

impl Device {
    /// Entity domain prefix, the part of the entity id before the dot.
    pub fn domain(&self) -> &str {
        self.entity_id.split('.').next().unwrap_or("")
    }

    /// Copy of this device with its canonical label filled in.
    pub fn with_canonical_label(self, canonical: String) -> Self {
        Self {
            canonical_label: Some(canonical),
            ..self
        }
    }

    /// Copy of this device with an overridden travel time.
    pub fn with_travel_seconds(self, seconds: f64) -> Self {
        Self {
            blind_travel_seconds: Some(seconds),
            ..self
        }
    }

    #[cfg(test)]
    pub fn for_test(entity_id: &str, state: &str, area: &str, labels: &[&str]) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            device_id: format!("dev-{entity_id}"),
            name: entity_id.to_string(),
            state: state.to_string(),
            area: area.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            label: None,
            category: None,
            canonical_label: None,
            attributes: serde_json::Map::new(),
            blind_travel_seconds: None,
        }
    }
}
