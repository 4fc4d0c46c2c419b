use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Sentinel label for devices that resolve to no known category.
pub const OTHER_LABEL: &str = "Other";

/// A canonical device category.
///
/// Categories are static data: the table below is the whole taxonomy, and the
/// registry built from it is shared read-only for the life of the process.
#[derive(Debug)]
pub struct Category {
    /// Canonical name, unique across the table.
    pub name: &'static str,

    /// Case-insensitive aliases that resolve to this category.
    pub synonyms: &'static [&'static str],

    /// Position in UI grouping; a total order across the table.
    pub display_order: u32,

    /// Eligible for a main dashboard tile.
    pub is_primary: bool,

    /// Read-only telemetry rather than an actionable device.
    pub is_sensor: bool,

    /// Shown only on detail screens, never as a dashboard tile.
    pub is_detail_only: bool,
}

static CATEGORIES: &[Category] = &[
    Category {
        name: "Light",
        synonyms: &["Lights", "Lamp", "Lighting"],
        display_order: 10,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Switch",
        synonyms: &["Switches", "Wall Switch"],
        display_order: 20,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Plug",
        synonyms: &["Smart Plug", "Outlet", "Socket"],
        display_order: 30,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Blind",
        synonyms: &["Blinds", "Shade", "Shades", "Roller Blind"],
        display_order: 40,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Curtain",
        synonyms: &["Curtains", "Drape", "Drapes"],
        display_order: 50,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Thermostat",
        synonyms: &["Heating", "Climate"],
        display_order: 60,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Lock",
        synonyms: &["Locks", "Door Lock"],
        display_order: 70,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Media Player",
        synonyms: &["Media", "Speaker", "TV"],
        display_order: 80,
        is_primary: true,
        is_sensor: false,
        is_detail_only: false,
    },
    Category {
        name: "Motion Sensor",
        synonyms: &["Motion", "Occupancy Sensor", "Presence Sensor"],
        display_order: 90,
        is_primary: true,
        is_sensor: true,
        is_detail_only: false,
    },
    Category {
        name: "Door Sensor",
        synonyms: &["Door Contact", "Contact Sensor"],
        display_order: 100,
        is_primary: false,
        is_sensor: true,
        is_detail_only: false,
    },
    Category {
        name: "Window Sensor",
        synonyms: &["Window Contact"],
        display_order: 110,
        is_primary: false,
        is_sensor: true,
        is_detail_only: false,
    },
    Category {
        name: "Temperature Sensor",
        synonyms: &["Temperature"],
        display_order: 120,
        is_primary: false,
        is_sensor: true,
        is_detail_only: false,
    },
    Category {
        name: "Humidity Sensor",
        synonyms: &["Humidity"],
        display_order: 130,
        is_primary: false,
        is_sensor: true,
        is_detail_only: false,
    },
    Category {
        name: "Camera",
        synonyms: &["Cameras", "Doorbell Camera"],
        display_order: 140,
        is_primary: false,
        is_sensor: false,
        is_detail_only: true,
    },
];

/// Precomputed lookup over the static category table.
pub struct LabelRegistry {
    /// Lowercased name/synonym -> category.
    by_alias: HashMap<String, &'static Category>,

    /// Categories sorted by display order.
    ordered: Vec<&'static Category>,
}

static REGISTRY: LazyLock<LabelRegistry> = LazyLock::new(LabelRegistry::build);

/// The process-wide registry instance.
pub fn registry() -> &'static LabelRegistry {
    &REGISTRY
}

impl LabelRegistry {
    fn build() -> Self {
        // Alias keys are stored lowercased; the table keeps display casing.
        let mut by_alias = HashMap::new();
        for category in CATEGORIES {
            by_alias.insert(category.name.to_lowercase(), category);
            for synonym in category.synonyms {
                by_alias.insert(synonym.to_lowercase(), category);
            }
        }

        let mut ordered: Vec<_> = CATEGORIES.iter().collect();
        ordered.sort_by_key(|c| c.display_order);

        Self { by_alias, ordered }
    }

    /// Resolve a raw label to its category, if any.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn resolve(&self, raw: &str) -> Option<&'static Category> {
        let needle = raw.trim();
        if needle.is_empty() {
            return None;
        }
        self.by_alias.get(&needle.to_lowercase()).copied()
    }

    /// Resolve a raw label to its canonical name.
    pub fn canonical(&self, raw: &str) -> Option<&'static str> {
        self.resolve(raw).map(|c| c.name)
    }

    /// Whether a raw label resolves to a dashboard-eligible category.
    pub fn is_primary(&self, raw: &str) -> bool {
        self.resolve(raw).map(|c| c.is_primary).unwrap_or(false)
    }

    /// Whether a raw label resolves to a telemetry category.
    pub fn is_sensor(&self, raw: &str) -> bool {
        self.resolve(raw).map(|c| c.is_sensor).unwrap_or(false)
    }

    /// Whether a raw label resolves to a detail-only category.
    pub fn is_detail_only(&self, raw: &str) -> bool {
        self.resolve(raw).map(|c| c.is_detail_only).unwrap_or(false)
    }

    /// All categories in display order.
    pub fn ordered_categories(&self) -> impl Iterator<Item = &'static Category> + '_ {
        self.ordered.iter().copied()
    }

    /// Sort raw labels for stable UI grouping.
    ///
    /// Resolved labels sort by their category's display order, tie-breaking
    /// case-insensitively. Unresolved labels sort after every resolved label,
    /// among themselves case-insensitively.
    pub fn sort_labels(&self, labels: &mut [String]) {
        labels.sort_by(|a, b| self.label_order(a, b));
    }

    fn label_order(&self, a: &str, b: &str) -> Ordering {
        let key = |label: &str| match self.resolve(label) {
            Some(category) => (0u8, category.display_order),
            None => (1u8, 0),
        };
        key(a)
            .cmp(&key(b))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_canonical_names_and_synonyms() {
        let reg = registry();
        assert_eq!(reg.canonical("Light"), Some("Light"));
        assert_eq!(reg.canonical("Shades"), Some("Blind"));
        assert_eq!(reg.canonical("shades"), Some("Blind"));
        assert_eq!(reg.canonical(" Shades "), Some("Blind"));
        assert_eq!(reg.canonical("SMART PLUG"), Some("Plug"));
    }

    #[test]
    fn unmatched_labels_do_not_resolve() {
        let reg = registry();
        assert_eq!(reg.resolve("Flux Capacitor").map(|c| c.name), None);
        assert_eq!(reg.canonical(""), None);
        assert_eq!(reg.canonical("   "), None);
        assert!(!reg.is_primary("Flux Capacitor"));
        assert!(!reg.is_sensor("Flux Capacitor"));
        assert!(!reg.is_detail_only("Flux Capacitor"));
    }

    #[test]
    fn flags_follow_the_table() {
        let reg = registry();
        assert!(reg.is_primary("Light"));
        assert!(!reg.is_sensor("Light"));
        assert!(reg.is_sensor("Temperature"));
        assert!(!reg.is_primary("Temperature"));
        assert!(reg.is_detail_only("Camera"));
        assert!(reg.is_primary("Motion"));
        assert!(reg.is_sensor("Motion"));
    }

    #[test]
    fn ordered_categories_follow_display_order() {
        let names: Vec<_> = registry().ordered_categories().map(|c| c.name).collect();
        insta::assert_snapshot!(names.join(", "), @"Light, Switch, Plug, Blind, Curtain, Thermostat, Lock, Media Player, Motion Sensor, Door Sensor, Window Sensor, Temperature Sensor, Humidity Sensor, Camera");
    }

    #[test]
    fn sort_labels_orders_resolved_before_unresolved() {
        let mut labels = vec![
            "Unknown Thing".to_string(),
            "Shades".to_string(),
            "another thing".to_string(),
            "Lamp".to_string(),
        ];
        registry().sort_labels(&mut labels);
        assert_eq!(labels, vec!["Lamp", "Shades", "another thing", "Unknown Thing"]);
    }

    #[test]
    fn sort_labels_tie_breaks_lexically() {
        // Shade and Shades resolve to the same category and display order.
        let mut labels = vec!["Shades".to_string(), "Shade".to_string()];
        registry().sort_labels(&mut labels);
        assert_eq!(labels, vec!["Shade", "Shades"]);
    }
}
