use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::device::Device;
use crate::session::ConnectivityMode;

type CacheKey = (String, ConnectivityMode);

/// Assembled device lists, keyed by `(user_id, mode)`.
///
/// Readers load an immutable snapshot; writers replace the whole map, so a
/// reader never observes an entry for a mode that was just switched away from
/// as if it were current. Entries are only ever written by a completed
/// assembly pass and only ever cleared by a mode-switch commit.
#[derive(Default)]
pub struct DeviceCache {
    entries: ArcSwap<HashMap<CacheKey, Arc<Vec<Device>>>>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str, mode: ConnectivityMode) -> Option<Arc<Vec<Device>>> {
        self.entries
            .load()
            .get(&(user_id.to_string(), mode))
            .cloned()
    }

    pub fn store(&self, user_id: &str, mode: ConnectivityMode, devices: Vec<Device>) {
        let key = (user_id.to_string(), mode);
        let devices = Arc::new(devices);
        self.entries.rcu(|entries| {
            let mut next = HashMap::clone(entries);
            next.insert(key.clone(), Arc::clone(&devices));
            next
        });
    }

    pub fn invalidate(&self, user_id: &str, mode: ConnectivityMode) {
        let key = (user_id.to_string(), mode);
        self.entries.rcu(|entries| {
            let mut next = HashMap::clone(entries);
            next.remove(&key);
            next
        });
    }
}
