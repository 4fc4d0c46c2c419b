use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use strum::Display;

use super::device::Device;

/// Account role, resolved by the external identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full visibility, no area restriction.
    Admin,

    /// Sees only the areas granted by access rules.
    Tenant,
}

/// Resolved identity context for one directory caller.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
    pub role: Role,

    /// Areas this user may see. Ignored for admins.
    pub areas: BTreeSet<String>,

    /// Identity of the paired hub connection, used to key cached overrides.
    pub hub_connection_id: String,
}

impl UserContext {
    pub fn admin(user_id: &str, hub_connection_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Admin,
            areas: BTreeSet::new(),
            hub_connection_id: hub_connection_id.to_string(),
        }
    }

    pub fn tenant(user_id: &str, hub_connection_id: &str, areas: &[&str]) -> Self {
        Self {
            user_id: user_id.to_string(),
            role: Role::Tenant,
            areas: areas.iter().map(|a| a.to_string()).collect(),
            hub_connection_id: hub_connection_id.to_string(),
        }
    }
}

/// Apply role-based area filtering.
///
/// Tenants keep only devices whose area appears in their access rules; admins
/// receive the list unfiltered. Backend ordering is preserved.
pub fn filter_by_area(devices: Vec<Device>, ctx: &UserContext) -> Vec<Device> {
    match ctx.role {
        Role::Admin => devices,
        Role::Tenant => devices
            .into_iter()
            .filter(|device| ctx.areas.contains(&device.area))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Device> {
        vec![
            Device::for_test("light.kitchen", "on", "Kitchen", &["Light"]),
            Device::for_test("light.bedroom", "off", "Bedroom", &["Light"]),
            Device::for_test("cover.lounge", "open", "Lounge", &["Blinds"]),
        ]
    }

    #[test]
    fn admins_see_everything() {
        let ctx = UserContext::admin("alice", "hub-1");
        assert_eq!(filter_by_area(sample(), &ctx).len(), 3);
    }

    #[test]
    fn tenants_see_only_their_areas() {
        let ctx = UserContext::tenant("bob", "hub-1", &["Kitchen", "Lounge"]);
        let visible = filter_by_area(sample(), &ctx);
        let ids: Vec<_> = visible.iter().map(|d| d.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["light.kitchen", "cover.lounge"]);
    }

    #[test]
    fn tenant_with_no_rules_sees_nothing() {
        let ctx = UserContext::tenant("carol", "hub-1", &[]);
        assert!(filter_by_area(sample(), &ctx).is_empty());
    }
}
