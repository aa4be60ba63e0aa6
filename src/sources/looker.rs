//! `looker` source kind.

use super::{LookerCapabilities, Source, SourceConfig};
use crate::looker::{ApiSettings, HttpLookerClient, LookerApi, DEFAULT_API_VERSION};
use crate::registry::SourceKindRegistry;
use crate::types::{Error, HttpConfig, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const KIND: &str = "looker";

const DEFAULT_AUTH_HEADER: &str = "Authorization";

fn default_true() -> bool {
    true
}

fn default_auth_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Declared Looker instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookerSourceConfig {
    #[serde(skip)]
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    /// Falls back to the process-wide HTTP timeout.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub use_client_oauth: bool,
    #[serde(default = "default_auth_header")]
    pub auth_header_name: String,
}

impl LookerSourceConfig {
    pub fn decode(name: &str, value: serde_yaml::Value) -> Result<Self> {
        let mut config: Self = serde_yaml::from_value(value).map_err(|e| {
            Error::config_decode(format!("unable to parse source {:?}: {}", name, e))
        })?;
        config.name = name.to_string();
        config.validate()?;
        Ok(config)
    }

    fn factory(name: &str, value: serde_yaml::Value) -> Result<Box<dyn SourceConfig>> {
        Ok(Box::new(Self::decode(name, value)?))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Error::config_validation(format!("source {:?}: {}", self.name, msg));

        if self.base_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(invalid("base_url is required"));
        }
        if self.auth_header_name.trim().is_empty() {
            return Err(invalid("auth_header_name cannot be empty"));
        }
        if !self.use_client_oauth {
            let present = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.is_empty());
            if !present(&self.client_id) || !present(&self.client_secret) {
                return Err(invalid(
                    "client_id and client_secret are required unless use_client_oauth is set",
                ));
            }
        }
        Ok(())
    }

    fn api_settings(&self, http: &HttpConfig) -> ApiSettings {
        let mut settings = ApiSettings::new(self.base_url.clone().unwrap_or_default());
        settings.api_version = self.api_version.clone();
        settings.verify_ssl = self.verify_ssl;
        settings.timeout = self.timeout.unwrap_or(http.timeout);
        settings.user_agent = http.user_agent.clone();
        settings.client_id = self.client_id.clone();
        settings.client_secret = self.client_secret.clone();
        settings
    }
}

#[async_trait]
impl SourceConfig for LookerSourceConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    async fn initialize(&self, http: &HttpConfig) -> Result<Arc<dyn Source>> {
        let settings = self.api_settings(http);
        let client = if self.use_client_oauth {
            HttpLookerClient::without_credentials(settings.clone())
        } else {
            HttpLookerClient::service(settings.clone())
        }
        .map_err(|e| {
            Error::config_validation(format!("source {:?}: unable to build client: {}", self.name, e))
        })?;

        info!(
            source = %self.name,
            base_url = %settings.base_url,
            use_client_oauth = self.use_client_oauth,
            "initialized looker source"
        );

        Ok(Arc::new(LookerSource::new(
            self.name.clone(),
            settings,
            self.use_client_oauth,
            self.auth_header_name.clone(),
            Arc::new(client),
        )))
    }
}

/// Connected Looker instance.
pub struct LookerSource {
    name: String,
    settings: ApiSettings,
    use_client_oauth: bool,
    auth_header_name: String,
    client: Arc<dyn LookerApi>,
}

impl LookerSource {
    pub fn new(
        name: impl Into<String>,
        settings: ApiSettings,
        use_client_oauth: bool,
        auth_header_name: impl Into<String>,
        client: Arc<dyn LookerApi>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            use_client_oauth,
            auth_header_name: auth_header_name.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for LookerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookerSource")
            .field("name", &self.name)
            .field("base_url", &self.settings.base_url)
            .field("use_client_oauth", &self.use_client_oauth)
            .field("auth_header_name", &self.auth_header_name)
            .finish_non_exhaustive()
    }
}

impl Source for LookerSource {
    fn kind(&self) -> &str {
        KIND
    }

    fn looker(&self) -> Option<&dyn LookerCapabilities> {
        Some(self)
    }
}

impl LookerCapabilities for LookerSource {
    fn use_client_authorization(&self) -> bool {
        self.use_client_oauth
    }

    fn auth_token_header_name(&self) -> &str {
        &self.auth_header_name
    }

    fn client(&self) -> Arc<dyn LookerApi> {
        Arc::clone(&self.client)
    }

    fn api_settings(&self) -> &ApiSettings {
        &self.settings
    }
}

/// Add the `looker` source kind.
pub fn register(registry: &mut SourceKindRegistry) -> Result<()> {
    registry.try_register(KIND, LookerSourceConfig::factory)
}
