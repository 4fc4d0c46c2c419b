use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use linkme::distributed_slice;
use tracing::debug;
use url::Url;

use super::traits::BackendError;
use super::traits::HubBackend;
use super::traits::OverrideStore;
use super::BackendContext;
use super::BackendFactoryResult;
use super::BackendRegistration;
use super::REGISTRY;
use crate::directory::Device;

/// Timeout for the best-effort travel-time lookup. Short: the directory
/// returns with defaults if this budget is blown.
const OVERRIDE_TIMEOUT: Duration = Duration::from_secs(5);

/// Local hub API client.
///
/// Also serves the cached travel-time overrides, which live on the hub and
/// are keyed by the connection identity of the pairing that calibrated them.
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Option<String>,

    /// (connection identity, entity id) -> calibrated seconds.
    travel_cache: Mutex<HashMap<(String, String), f64>>,
}

impl HubClient {
    pub fn new(base_url: &str, credential: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            credential,
            travel_cache: Mutex::new(HashMap::new()),
        })
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, BackendError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::Other(format!("bad hub path '{path}': {e}")))?;
        let mut request = self.http.get(url);
        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential);
        }
        Ok(request)
    }
}

#[async_trait]
impl HubBackend for HubClient {
    async fn probe(&self, timeout: Duration) -> bool {
        let Ok(request) = self.get("api/ping") else {
            return false;
        };
        match request.timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>, BackendError> {
        let response = self.get("api/devices")?.send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Vec<Device>>().await?)
    }
}

#[async_trait]
impl OverrideStore for HubClient {
    async fn travel_times(
        &self,
        entity_ids: &[String],
        hub_connection_id: &str,
    ) -> Result<HashMap<String, f64>, BackendError> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        {
            let cache = self
                .travel_cache
                .lock()
                .map_err(|e| BackendError::Other(format!("travel cache poisoned: {e}")))?;
            for id in entity_ids {
                let key = (hub_connection_id.to_string(), id.clone());
                match cache.get(&key) {
                    Some(&seconds) => {
                        found.insert(id.clone(), seconds);
                    }
                    None => missing.push(id.clone()),
                }
            }
        }

        if missing.is_empty() {
            return Ok(found);
        }

        debug!("fetching travel times for {} entities", missing.len());
        let fetched = self.fetch_travel_times(&missing).await;
        match fetched {
            Ok(times) => {
                if let Ok(mut cache) = self.travel_cache.lock() {
                    for (id, seconds) in &times {
                        cache.insert((hub_connection_id.to_string(), id.clone()), *seconds);
                    }
                }
                found.extend(times);
                Ok(found)
            }
            // Partial answers are still useful; the caller treats this whole
            // lookup as best-effort anyway.
            Err(_) if !found.is_empty() => Ok(found),
            Err(e) => Err(e),
        }
    }
}

impl HubClient {
    async fn fetch_travel_times(
        &self,
        entity_ids: &[String],
    ) -> Result<HashMap<String, f64>, BackendError> {
        let response = self
            .get("api/covers/travel_times")?
            .query(&[("ids", entity_ids.join(","))])
            .timeout(OVERRIDE_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(response.json::<HashMap<String, f64>>().await?)
    }
}

#[distributed_slice(REGISTRY)]
fn init_hub(ctx: &BackendContext) -> BackendFactoryResult {
    let Some(hub) = &ctx.config.hub else {
        return Ok(None);
    };

    let client = Arc::new(HubClient::new(&hub.base_url, hub.credential.clone())?);
    Ok(Some(BackendRegistration::Hub {
        hub: Arc::clone(&client) as Arc<dyn HubBackend>,
        overrides: client,
    }))
}
