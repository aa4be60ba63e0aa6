//! Data sources and capability resolution.
//!
//! A tool never names a concrete source type. It asks the [`SourceRegistry`]
//! for a [`Capability`]; any source whose accessor exposes the matching
//! interface satisfies it, and anything else fails with
//! [`Error::IncompatibleSource`].

pub mod looker;

pub use self::looker::{LookerSource, LookerSourceConfig};

use crate::looker::{get_client, ApiSettings, LookerApi};
use crate::registry::SourceKindRegistry;
use crate::tools::AccessToken;
use crate::types::{Error, HttpConfig, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// An initialized, shared data source.
pub trait Source: Send + Sync + fmt::Debug {
    fn kind(&self) -> &str;

    /// Looker capabilities, if this source offers them.
    fn looker(&self) -> Option<&dyn LookerCapabilities> {
        None
    }
}

/// What a Looker-backed tool needs from its source.
pub trait LookerCapabilities: Send + Sync {
    fn use_client_authorization(&self) -> bool;

    fn auth_token_header_name(&self) -> &str;

    /// Shared client: the service client, or the template per-call
    /// clients are derived from in caller-credential mode.
    fn client(&self) -> Arc<dyn LookerApi>;

    fn api_settings(&self) -> &ApiSettings;
}

/// A view of a source that a tool kind requires.
pub trait Capability: Sized {
    /// Human-readable description used in incompatibility errors.
    const NAME: &'static str;

    fn from_source(source: &dyn Source) -> Option<Self>;
}

/// Resolved Looker capability set, held by a tool after initialization.
#[derive(Clone)]
pub struct LookerHandle {
    pub use_client_oauth: bool,
    pub auth_header_name: String,
    pub client: Arc<dyn LookerApi>,
    pub api_settings: ApiSettings,
}

impl LookerHandle {
    /// Client for one call under the source's credential mode.
    pub fn client_for(&self, access_token: Option<&AccessToken>) -> Result<Arc<dyn LookerApi>> {
        get_client(
            self.use_client_oauth,
            &self.api_settings,
            &self.client,
            access_token,
        )
    }
}

impl fmt::Debug for LookerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookerHandle")
            .field("use_client_oauth", &self.use_client_oauth)
            .field("auth_header_name", &self.auth_header_name)
            .field("base_url", &self.api_settings.base_url)
            .finish_non_exhaustive()
    }
}

impl Capability for LookerHandle {
    const NAME: &'static str =
        "looker capabilities (credential mode, auth header name, api client, api settings)";

    fn from_source(source: &dyn Source) -> Option<Self> {
        source.looker().map(|caps| LookerHandle {
            use_client_oauth: caps.use_client_authorization(),
            auth_header_name: caps.auth_token_header_name().to_string(),
            client: caps.client(),
            api_settings: caps.api_settings().clone(),
        })
    }
}

/// Initialized sources by name.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: Arc<dyn Source>) {
        self.sources.insert(name.into(), source);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look up `name` and project it onto capability `C`.
    pub fn resolve<C: Capability>(&self, name: &str, tool_kind: &str) -> Result<C> {
        let source = self
            .get(name)
            .ok_or_else(|| Error::UnknownSource(name.to_string()))?;
        C::from_source(source.as_ref()).ok_or_else(|| Error::IncompatibleSource {
            source_name: name.to_string(),
            tool_kind: tool_kind.to_string(),
            capability: C::NAME,
        })
    }
}

/// Decoded, not yet connected, source declaration.
#[async_trait]
pub trait SourceConfig: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> &str;

    async fn initialize(&self, http: &HttpConfig) -> Result<Arc<dyn Source>>;
}

pub type SourceConfigs = BTreeMap<String, Box<dyn SourceConfig>>;

/// Decode the `sources` section, dispatching each record on its `kind`.
pub fn decode_source_configs(
    registry: &SourceKindRegistry,
    sources: &serde_yaml::Mapping,
) -> Result<SourceConfigs> {
    registry.decode_section("source", sources, |factory, name, value| factory(name, value))
}
