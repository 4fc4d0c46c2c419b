//! Clients for the external collaborators: the cloud platform API, the local
//! hub API, the identity/context service, and the travel-time override cache.
//! The core consumes these through the traits in `traits`; concrete clients
//! register themselves in `REGISTRY` and are constructed from configuration
//! at startup.

mod cloud;
mod hub;
mod identity;
mod traits;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use linkme::distributed_slice;
use tracing::info;

pub use cloud::PlatformClient;
pub use hub::HubClient;
pub use identity::ConfigIdentity;
pub use traits::BackendError;
pub use traits::CloudBackend;
pub use traits::CloudDeviceList;
pub use traits::HubBackend;
pub use traits::IdentityService;
pub use traits::OverrideStore;

#[cfg(test)]
pub use traits::mock;

use crate::config::Config;

pub struct BackendContext<'a> {
    pub config: &'a Config,
}

/// What one factory contributes. The hub pairing contributes two views of
/// the same client: the device API and the override cache it hosts.
pub enum BackendRegistration {
    Cloud(Arc<dyn CloudBackend>),
    Hub {
        hub: Arc<dyn HubBackend>,
        overrides: Arc<dyn OverrideStore>,
    },
}

/// Result type for backend factory functions
pub type BackendFactoryResult = anyhow::Result<Option<BackendRegistration>>;

#[distributed_slice]
pub static REGISTRY: [fn(&BackendContext) -> BackendFactoryResult];

/// The set of configured backends.
pub struct Backends {
    pub cloud: Option<Arc<dyn CloudBackend>>,
    pub hub: Option<Arc<dyn HubBackend>>,
    pub overrides: Arc<dyn OverrideStore>,
}

/// Construct every backend whose configuration section is present.
pub fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    let ctx = BackendContext { config };
    let mut cloud = None;
    let mut hub = None;
    let mut overrides: Option<Arc<dyn OverrideStore>> = None;

    for factory in REGISTRY {
        match factory(&ctx)? {
            Some(BackendRegistration::Cloud(client)) => {
                info!("cloud platform backend configured");
                cloud = Some(client);
            }
            Some(BackendRegistration::Hub {
                hub: client,
                overrides: store,
            }) => {
                info!("home hub backend configured");
                hub = Some(client);
                overrides = Some(store);
            }
            None => {}
        }
    }

    Ok(Backends {
        cloud,
        hub,
        overrides: overrides.unwrap_or_else(|| Arc::new(NoOverrides)),
    })
}

/// Override store for accounts with no hub pairing: nothing is calibrated.
struct NoOverrides;

#[async_trait]
impl OverrideStore for NoOverrides {
    async fn travel_times(
        &self,
        _entity_ids: &[String],
        _hub_connection_id: &str,
    ) -> Result<HashMap<String, f64>, BackendError> {
        Ok(HashMap::new())
    }
}
