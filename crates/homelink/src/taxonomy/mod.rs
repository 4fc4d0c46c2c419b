//! The static device taxonomy: canonical categories, per-category
//! capabilities, and the classification rules that map raw backend records
//! onto them.

pub mod capability;
pub mod classify;
pub mod registry;

pub use capability::actions_for;
pub use capability::capability_for;
pub use capability::eligible_for_automation;
pub use capability::triggers_for;
pub use capability::ActionKind;
pub use capability::ActionSpec;
pub use capability::CapabilitySpec;
pub use capability::TriggerKind;
pub use capability::TriggerSpec;
pub use classify::group_label;
pub use classify::is_primary;
pub use classify::is_sensor_state;
pub use classify::primary_label;
pub use registry::registry;
pub use registry::Category;
pub use registry::LabelRegistry;
pub use registry::OTHER_LABEL;
