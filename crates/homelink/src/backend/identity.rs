use std::collections::HashMap;

use async_trait::async_trait;

use super::traits::BackendError;
use super::traits::IdentityService;
use crate::config::Config;
use crate::directory::UserContext;

/// Identity/context service resolved from the daemon configuration.
///
/// Stands in for the platform's account service: roles and area access rules
/// come from the `[users]` table, the hub connection identity from the hub
/// pairing.
pub struct ConfigIdentity {
    users: HashMap<String, UserContext>,
}

impl ConfigIdentity {
    pub fn from_config(config: &Config) -> Self {
        let hub_connection_id = config
            .hub
            .as_ref()
            .map(|hub| hub.connection_identity())
            .unwrap_or_else(|| "unpaired".to_string());

        let users = config
            .users
            .iter()
            .map(|(user_id, user)| {
                let context = UserContext {
                    user_id: user_id.clone(),
                    role: user.role,
                    areas: user.areas.iter().cloned().collect(),
                    hub_connection_id: hub_connection_id.clone(),
                };
                (user_id.clone(), context)
            })
            .collect();

        Self { users }
    }
}

#[async_trait]
impl IdentityService for ConfigIdentity {
    async fn context(&self, user_id: &str) -> Result<UserContext, BackendError> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| BackendError::Other(format!("unknown user '{user_id}'")))
    }
}
