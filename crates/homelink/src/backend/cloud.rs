use std::sync::Arc;

use async_trait::async_trait;
use linkme::distributed_slice;
use url::Url;

use super::traits::BackendError;
use super::traits::CloudBackend;
use super::traits::CloudDeviceList;
use super::BackendContext;
use super::BackendFactoryResult;
use super::BackendRegistration;
use super::REGISTRY;

/// Cloud platform API client.
///
/// The device-list call is a single GET; its timeout is left to the
/// transport's own policy rather than the short probe budget.
pub struct PlatformClient {
    http: reqwest::Client,
    devices_url: Url,
    token: Option<String>,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            devices_url: base.join("api/v1/devices")?,
            token,
        })
    }
}

#[async_trait]
impl CloudBackend for PlatformClient {
    async fn fetch_devices(&self) -> Result<CloudDeviceList, BackendError> {
        let mut request = self.http.get(self.devices_url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }

        Ok(response.json::<CloudDeviceList>().await?)
    }
}

#[distributed_slice(REGISTRY)]
fn init_platform(ctx: &BackendContext) -> BackendFactoryResult {
    let Some(platform) = &ctx.config.platform else {
        return Ok(None);
    };

    let client = PlatformClient::new(&platform.base_url, platform.token.clone())?;
    Ok(Some(BackendRegistration::Cloud(Arc::new(client))))
}
