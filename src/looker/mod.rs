//! Looker vendor boundary.
//!
//! Tools talk to Looker only through [`LookerApi`]: a handful of typed admin
//! operations plus a raw `call` escape hatch for endpoints the typed surface
//! does not wrap yet. [`HttpLookerClient`] is the `reqwest` implementation;
//! tests substitute their own.

mod client;
mod credentials;
mod error;
pub mod models;

pub use client::HttpLookerClient;
pub use credentials::get_client;
pub use error::LookerError;
pub use models::{
    ModelSet, Permission, PermissionSet, Role, WriteModelSet, WritePermissionSet, WriteRole,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub use reqwest::Method;

/// Query string for raw calls. Ordered so requests are deterministic.
pub type QueryParams = BTreeMap<String, String>;

pub const DEFAULT_API_VERSION: &str = "4.0";

/// Connection settings shared by every client built for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_version: String,
    pub verify_ssl: bool,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            verify_ssl: true,
            timeout: Duration::from_secs(120),
            user_agent: concat!("looker-toolbox/", env!("CARGO_PKG_VERSION")).to_string(),
            client_id: None,
            client_secret: None,
        }
    }

    /// `{base_url}/api/{version}{path}`, tolerant of stray slashes.
    pub fn endpoint(&self, api_version: &str, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let version = api_version.trim_start_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/api/{}/{}", base, version, path)
    }

    pub fn has_client_credentials(&self) -> bool {
        matches!(
            (&self.client_id, &self.client_secret),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

/// Authenticated Looker client.
///
/// Implementations must be safe for concurrent use: in service-credential
/// mode one instance serves every in-flight invocation.
#[async_trait]
pub trait LookerApi: Send + Sync {
    async fn create_model_set(&self, body: &WriteModelSet) -> Result<ModelSet, LookerError>;

    async fn create_permission_set(
        &self,
        body: &WritePermissionSet,
    ) -> Result<PermissionSet, LookerError>;

    async fn create_role(&self, body: &WriteRole) -> Result<Role, LookerError>;

    async fn all_permissions(&self) -> Result<Vec<Permission>, LookerError>;

    /// Untyped request against `/api/{api_version}{path}`.
    async fn call(
        &self,
        method: Method,
        api_version: &str,
        path: &str,
        query: &QueryParams,
    ) -> Result<serde_json::Value, LookerError>;

    /// A client with the same settings that authenticates with `token`.
    fn with_bearer_token(&self, token: &str) -> Arc<dyn LookerApi>;
}
