use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::directory::Role;
use crate::session::network;
use crate::session::ConnectivityMode;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub api: ApiConfig,

    /// Local hub connection. Optional: cloud-only accounts have none.
    pub hub: Option<HubConfig>,

    /// Cloud platform connection. Optional: offline homes have none.
    pub platform: Option<PlatformConfig>,

    /// Household accounts and their area access rules.
    #[serde(default)]
    pub users: HashMap<String, UserConfig>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8650
}

#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Advertised base URL of the hub, e.g. "http://192.168.1.20:8123".
    pub base_url: String,

    /// Bearer credential for the hub API.
    pub credential: Option<String>,

    /// Identity of this hub pairing. Defaults to the base URL host. Cached
    /// per-device calibration is keyed by this, so a re-pair under a new
    /// identity starts from defaults.
    #[serde(default)]
    pub connection_id: Option<String>,

    /// Whether the linked hub connection has cloud control enabled.
    #[serde(default)]
    pub cloud_enabled: bool,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: f64,

    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

fn default_probe_timeout_secs() -> f64 {
    2.0
}

fn default_probe_interval_secs() -> u64 {
    30
}

impl HubConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.probe_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn connection_identity(&self) -> String {
        if let Some(id) = &self.connection_id {
            return id.clone();
        }
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the cloud platform API.
    pub base_url: String,

    /// Bearer token for the account.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub role: Role,

    /// Areas a tenant may see. Ignored for admins.
    #[serde(default)]
    pub areas: Vec<String>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        let config: Config = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate connection settings.
    ///
    /// An unencrypted hub URL targeting a non-private host is rejected here,
    /// outright: this configuration is never auto-corrected or downgraded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(hub) = &self.hub {
            let url = Url::parse(&hub.base_url).map_err(|e| {
                ConfigError::Validation(format!("hub.base_url '{}': {e}", hub.base_url))
            })?;
            if let Some(reason) = network::insecure_scheme_violation(&url) {
                return Err(ConfigError::Validation(format!("hub.base_url: {reason}")));
            }
        }

        if let Some(platform) = &self.platform {
            Url::parse(&platform.base_url).map_err(|e| {
                ConfigError::Validation(format!(
                    "platform.base_url '{}': {e}",
                    platform.base_url
                ))
            })?;
        }

        Ok(())
    }

    /// Cloud capability flag of the linked hub connection. Absent means no.
    pub fn cloud_enabled(&self) -> bool {
        self.hub.as_ref().map(|h| h.cloud_enabled).unwrap_or(false)
    }

    /// Mode the session starts in: Home when a hub is paired, Cloud otherwise.
    pub fn initial_mode(&self) -> ConnectivityMode {
        if self.hub.is_some() {
            ConnectivityMode::Home
        } else {
            ConnectivityMode::Cloud
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let toml = r#"
            [hub]
            base_url = "http://192.168.1.20:8123"
            cloud_enabled = true

            [platform]
            base_url = "https://platform.example.com"
            token = "secret"

            [users.alice]
            role = "admin"

            [users.bob]
            role = "tenant"
            areas = ["Kitchen", "Lounge"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.api.port, 8650);
        let hub = config.hub.as_ref().unwrap();
        assert_eq!(hub.probe_timeout(), Duration::from_secs(2));
        assert_eq!(hub.connection_identity(), "192.168.1.20");
        assert!(config.cloud_enabled());
        assert_eq!(config.initial_mode(), ConnectivityMode::Home);
        assert_eq!(config.users["bob"].areas.len(), 2);
    }

    #[test]
    fn cloud_only_config_starts_in_cloud_mode() {
        let toml = r#"
            [platform]
            base_url = "https://platform.example.com"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.initial_mode(), ConnectivityMode::Cloud);
        assert!(!config.cloud_enabled());
    }

    #[test]
    fn rejects_unencrypted_hub_on_public_host() {
        let toml = r#"
            [hub]
            base_url = "http://hub.example.com"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("non-private"));
    }

    #[test]
    fn rejects_a_malformed_hub_url() {
        let toml = r#"
            [hub]
            base_url = "not a url"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homelink.toml");
        std::fs::write(
            &path,
            r#"
                [logging]
                level = "debug"

                [hub]
                base_url = "https://hub.local"
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);

        let missing = Config::from_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_, _))));
    }
}
