//! Tool infrastructure: configuration, bound instances, manifests, invocation.
//!
//! A tool goes through two phases. A [`ToolConfig`] is decoded from the
//! toolbox document by the factory registered for its kind. `initialize`
//! resolves its source and produces an immutable [`Tool`] that owns its
//! parameter specs and both manifests and can be invoked concurrently.

pub mod config;
pub mod looker;
pub mod manifest;
pub mod output;
pub mod pipeline;

pub use config::{decode_tool_configs, BasicToolConfig, ToolAnnotations, ToolConfigs};
pub use manifest::{Manifest, McpManifest};
pub use output::{Record, RecordBuilder, ToolOutput};
pub use pipeline::{invoke_tool, InvocationRequest};

use crate::parameters::{Claims, EmbeddingModels, ParamValues};
use crate::sources::SourceRegistry;
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Decoded, not yet bound, tool declaration.
pub trait ToolConfig: Send + Sync + fmt::Debug {
    fn basic(&self) -> &BasicToolConfig;

    fn name(&self) -> &str {
        &self.basic().name
    }

    fn kind(&self) -> &str {
        &self.basic().kind
    }

    /// Resolve the referenced source and build the invocable instance.
    fn initialize(&self, sources: &SourceRegistry) -> Result<Arc<dyn Tool>>;
}

/// Bound, invocable tool. Immutable after initialization.
#[async_trait]
pub trait Tool: Send + Sync + fmt::Debug {
    fn config(&self) -> &BasicToolConfig;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn kind(&self) -> &str {
        &self.config().kind
    }

    fn parse_params(&self, args: &Map<String, Value>, claims: &Claims) -> Result<ParamValues>;

    async fn embed_params(
        &self,
        values: ParamValues,
        models: &EmbeddingModels,
    ) -> Result<ParamValues>;

    /// Execute one call. Never retried here.
    async fn invoke(
        &self,
        sources: &SourceRegistry,
        params: &ParamValues,
        access_token: Option<&AccessToken>,
    ) -> Result<ToolOutput>;

    fn manifest(&self) -> &Manifest;

    fn mcp_manifest(&self) -> &McpManifest;

    fn authorized(&self, verified_auth_services: &[String]) -> bool {
        is_authorized(&self.config().auth_required, verified_auth_services)
    }

    fn requires_client_authorization(&self, sources: &SourceRegistry) -> Result<bool>;

    fn auth_token_header_name(&self, sources: &SourceRegistry) -> Result<String>;
}

/// True when no auth service is required or any verified one is accepted.
pub fn is_authorized(required: &[String], verified: &[String]) -> bool {
    required.is_empty() || required.iter().any(|r| verified.contains(r))
}

/// Caller-supplied credential, as received in the auth header.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Token part of a `Bearer <token>` header value.
    pub fn parse_bearer_token(&self) -> Result<&str> {
        let mut parts = self.0.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(token)
            }
            _ => Err(Error::missing_credential(
                "authorization header must be in the format 'Bearer <token>'",
            )),
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authorized() {
        let none: Vec<String> = Vec::new();
        let google = vec!["google".to_string()];
        let github = vec!["github".to_string()];

        assert!(is_authorized(&none, &none));
        assert!(is_authorized(&none, &google));
        assert!(is_authorized(&google, &google));
        assert!(!is_authorized(&google, &none));
        assert!(!is_authorized(&google, &github));
    }

    #[test]
    fn test_parse_bearer_token() {
        assert_eq!(
            AccessToken::new("Bearer abc").parse_bearer_token().unwrap(),
            "abc"
        );
        assert_eq!(
            AccessToken::new("bearer   abc").parse_bearer_token().unwrap(),
            "abc"
        );
        assert!(AccessToken::new("abc").parse_bearer_token().is_err());
        assert!(AccessToken::new("Token abc").parse_bearer_token().is_err());
        assert!(AccessToken::new("Bearer a b").parse_bearer_token().is_err());
    }

    #[test]
    fn test_access_token_debug_redacted() {
        let token = AccessToken::new("Bearer secret");
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
