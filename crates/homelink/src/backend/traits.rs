use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::directory::Device;
use crate::directory::UserContext;

/// Errors from the external collaborators.
///
/// These never reach directory callers directly; the assembler folds them
/// into `ConnectionUnavailable` or swallows them for best-effort lookups.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Response shape of the cloud platform's device-list call.
#[derive(Debug, Default, Deserialize)]
pub struct CloudDeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Explicit error field; when present the whole response is an error.
    #[serde(default)]
    pub error: Option<String>,
}

/// External identity/context service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve a caller's role, area access rules, and hub connection identity.
    async fn context(&self, user_id: &str) -> Result<UserContext, BackendError>;
}

/// The cloud platform API.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Fetch the full device list in one call.
    async fn fetch_devices(&self) -> Result<CloudDeviceList, BackendError>;
}

/// The local hub API.
#[async_trait]
pub trait HubBackend: Send + Sync {
    /// Bounded reachability probe against the hub's advertised base URL.
    ///
    /// Never errors: any failure inside the timeout window reads as
    /// unreachable.
    async fn probe(&self, timeout: Duration) -> bool;

    /// Fetch the enriched device list, raw label arrays included.
    async fn fetch_devices(&self) -> Result<Vec<Device>, BackendError>;
}

/// Cache-backed per-entity travel-time override lookup. Best-effort.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Cached travel times for exactly the given entity ids, keyed by the hub
    /// connection identity so one pairing never inherits another's
    /// calibration.
    async fn travel_times(
        &self,
        entity_ids: &[String],
        hub_connection_id: &str,
    ) -> Result<HashMap<String, f64>, BackendError>;
}
