use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use super::access;
use super::access::UserContext;
use super::cache::DeviceCache;
use super::device::Device;
use super::overrides;
use crate::backend::CloudBackend;
use crate::backend::HubBackend;
use crate::backend::IdentityService;
use crate::backend::OverrideStore;
use crate::session::ConnectivityMode;
use crate::taxonomy::classify;

/// The only error surface of directory assembly.
///
/// Everything else (override lookups, metadata normalization, unresolved
/// labels) degrades to defaults instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The active backend cannot be reached or returned an explicit error.
    /// Recoverable by retrying or switching mode.
    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),
}

/// Assembles the device directory from the active backend.
///
/// One assembly pass is a strict sequential chain: identity resolution,
/// backend fetch, classification, area filtering, override enrichment. A
/// dropped (cancelled) pass commits nothing; the cache is written only after
/// the full list is assembled.
pub struct DeviceDirectory {
    identity: Arc<dyn IdentityService>,
    cloud: Option<Arc<dyn CloudBackend>>,
    hub: Option<Arc<dyn HubBackend>>,
    overrides: Arc<dyn OverrideStore>,
    cache: Arc<DeviceCache>,
    probe_timeout: Duration,
}

impl DeviceDirectory {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        cloud: Option<Arc<dyn CloudBackend>>,
        hub: Option<Arc<dyn HubBackend>>,
        overrides: Arc<dyn OverrideStore>,
        cache: Arc<DeviceCache>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            identity,
            cloud,
            hub,
            overrides,
            cache,
            probe_timeout,
        }
    }

    /// Fetch the assembled, filtered, enriched device list for one caller.
    ///
    /// Backend-provided ordering is preserved throughout.
    pub async fn fetch_devices(
        &self,
        user_id: &str,
        mode: ConnectivityMode,
    ) -> Result<Vec<Device>, DirectoryError> {
        let ctx = self.identity.context(user_id).await.map_err(|e| {
            DirectoryError::ConnectionUnavailable(format!("identity lookup failed: {e}"))
        })?;

        let devices = match mode {
            ConnectivityMode::Cloud => self.fetch_cloud().await?,
            ConnectivityMode::Home => self.fetch_home().await?,
        };

        // Classification is always reapplied locally; the backend's own
        // categorization is not trusted verbatim.
        let devices: Vec<Device> = devices
            .into_iter()
            .map(|device| {
                let canonical = classify::primary_label(&device);
                device.with_canonical_label(canonical)
            })
            .collect();

        let devices = access::filter_by_area(devices, &ctx);
        let devices = self.enrich_travel_times(devices, &ctx).await;

        self.cache.store(user_id, mode, devices.clone());
        Ok(devices)
    }

    /// Last assembled list for `(user_id, mode)`, if any.
    pub fn cached(&self, user_id: &str, mode: ConnectivityMode) -> Option<Arc<Vec<Device>>> {
        self.cache.get(user_id, mode)
    }

    async fn fetch_cloud(&self) -> Result<Vec<Device>, DirectoryError> {
        let cloud = self.cloud.as_ref().ok_or_else(|| {
            DirectoryError::ConnectionUnavailable("no cloud platform is configured".to_string())
        })?;

        let list = cloud.fetch_devices().await.map_err(|e| {
            DirectoryError::ConnectionUnavailable(format!("cloud platform request failed: {e}"))
        })?;

        if let Some(error) = list.error {
            return Err(DirectoryError::ConnectionUnavailable(format!(
                "cloud platform reported an error: {error}"
            )));
        }

        Ok(list.devices)
    }

    async fn fetch_home(&self) -> Result<Vec<Device>, DirectoryError> {
        let hub = self.hub.as_ref().ok_or_else(|| {
            DirectoryError::ConnectionUnavailable("no home hub is configured".to_string())
        })?;

        // Short probe first so an offline hub fails fast with advice instead
        // of hanging on the fetch.
        if !hub.probe(self.probe_timeout).await {
            return Err(DirectoryError::ConnectionUnavailable(
                "the home hub did not respond; switch to Cloud Mode to keep controlling \
                 your devices"
                    .to_string(),
            ));
        }

        hub.fetch_devices().await.map_err(|e| {
            DirectoryError::ConnectionUnavailable(format!("home hub request failed: {e}"))
        })
    }

    /// Merge cached travel-time overrides for motorized covers. Best-effort:
    /// any failure leaves default travel times in place.
    async fn enrich_travel_times(&self, devices: Vec<Device>, ctx: &UserContext) -> Vec<Device> {
        let ids = overrides::cover_entity_ids(&devices);
        if ids.is_empty() {
            return devices;
        }

        match self
            .overrides
            .travel_times(&ids, &ctx.hub_connection_id)
            .await
        {
            Ok(map) => {
                debug!("applied {} travel-time overrides", map.len());
                overrides::apply_travel_overrides(devices, &map)
            }
            Err(e) => {
                warn!("travel-time override lookup failed, keeping defaults: {e}");
                devices
            }
        }
    }
}
