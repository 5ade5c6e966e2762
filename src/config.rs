use crate::forwarder::{DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT_NAME, DEFAULT_UPSTREAM_TIMEOUT};
use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

/// Prefix for structured overrides, e.g. `MILO__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "MILO";

/// Well-known variables honoured on top of the prefixed ones
pub mod env_vars {
    pub const ENVIRONMENT: &str = "MILO_ENVIRONMENT";
    pub const PORT: &str = "PORT";
    pub const ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
    pub const API_KEY: &str = "AZURE_OPENAI_API_KEY";
    pub const DEPLOYMENT_NAME: &str = "AZURE_OPENAI_DEPLOYMENT_NAME";
    pub const API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct UpstreamSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub deployment_name: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl UpstreamSettings {
    /// Upper bound for one upstream call; never zero
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("deployment_name", &self.deployment_name)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Settings {
    /// Load settings from defaults, optional config files and the process environment
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Load settings using `vars` in place of the process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        let environment = vars
            .get(env_vars::ENVIRONMENT)
            .cloned()
            .unwrap_or_else(|| "development".to_string());
        let lookup = |name: &str| vars.get(name).cloned();

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("upstream.deployment_name", DEFAULT_DEPLOYMENT_NAME)?
            .set_default("upstream.api_version", DEFAULT_API_VERSION)?
            .set_default("upstream.timeout_secs", DEFAULT_UPSTREAM_TIMEOUT.as_secs())?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .source(Some(vars.clone())),
            )
            // Deployment-standard names take precedence
            .set_override_option("server.port", lookup(env_vars::PORT))?
            .set_override_option("upstream.endpoint", lookup(env_vars::ENDPOINT))?
            .set_override_option("upstream.api_key", lookup(env_vars::API_KEY))?
            .set_override_option(
                "upstream.deployment_name",
                lookup(env_vars::DEPLOYMENT_NAME).filter(|v| !v.trim().is_empty()),
            )?
            .set_override_option("upstream.api_version", lookup(env_vars::API_VERSION))?
            .build()?;

        config.try_deserialize()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
