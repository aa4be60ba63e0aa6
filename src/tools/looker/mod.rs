//! Looker admin tools.
//!
//! Each kind is a [`LookerOperation`]: its parameter list, its read-only
//! default, and the one vendor call it makes. [`LookerToolConfig`] and
//! [`LookerTool`] carry everything the kinds share: decoding, source
//! resolution, manifests, credential selection.

mod create_model_set;
mod create_permission_set;
mod create_role;
mod get_all_permissions;
mod search_permission_sets;
mod search_roles;

pub use create_model_set::CreateModelSet;
pub use create_permission_set::CreatePermissionSet;
pub use create_role::CreateRole;
pub use get_all_permissions::GetAllPermissions;
pub use search_permission_sets::SearchPermissionSets;
pub use search_roles::SearchRoles;

use super::{
    AccessToken, BasicToolConfig, Manifest, McpManifest, Record, RecordBuilder, Tool, ToolConfig,
    ToolOutput,
};
use crate::looker::{LookerApi, LookerError, Method, ModelSet, PermissionSet, QueryParams};
use crate::parameters::{self, Claims, EmbeddingModels, ParamSpec, ParamSpecs, ParamValues};
use crate::registry::ToolKindRegistry;
use crate::sources::{LookerHandle, SourceRegistry};
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Api version path segment for raw calls.
const RAW_API_VERSION: &str = "/4.0";

/// The kind-specific part of a Looker tool.
#[async_trait]
pub trait LookerOperation: Default + Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: &'static str;

    /// Default `readOnlyHint` when the config sets none.
    const READ_ONLY: bool;

    fn parameters(&self) -> Vec<ParamSpec>;

    async fn run(&self, client: &dyn LookerApi, params: &ParamValues) -> Result<ToolOutput>;
}

/// Decoded config for any Looker tool kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LookerToolConfig<O> {
    pub base: BasicToolConfig,
    op: PhantomData<O>,
}

impl<O: LookerOperation> LookerToolConfig<O> {
    pub fn new(base: BasicToolConfig) -> Self {
        Self {
            base,
            op: PhantomData,
        }
    }

    pub fn decode(name: &str, value: serde_yaml::Value) -> Result<Self> {
        let base = BasicToolConfig::decode(name, value)?;
        if base.kind != O::KIND {
            return Err(Error::config_validation(format!(
                "tool {:?} has kind {:?}, expected {:?}",
                name,
                base.kind,
                O::KIND
            )));
        }
        Ok(Self::new(base))
    }

    fn factory(name: &str, value: serde_yaml::Value) -> Result<Box<dyn ToolConfig>> {
        Ok(Box::new(Self::decode(name, value)?))
    }
}

impl<O: LookerOperation> ToolConfig for LookerToolConfig<O> {
    fn basic(&self) -> &BasicToolConfig {
        &self.base
    }

    fn initialize(&self, sources: &SourceRegistry) -> Result<Arc<dyn Tool>> {
        let handle: LookerHandle = sources.resolve(&self.base.source, O::KIND)?;
        let op = O::default();
        let params = ParamSpecs::new(op.parameters())?;
        let annotations = self.base.annotations_or_default(O::READ_ONLY);

        let manifest = Manifest::build(&self.base, &params);
        let mcp_manifest = McpManifest::build(&self.base, &params, annotations);

        info!(
            tool = %self.base.name,
            kind = O::KIND,
            source = %self.base.source,
            "initialized tool"
        );

        Ok(Arc::new(LookerTool {
            config: self.base.clone(),
            op,
            params,
            handle,
            manifest,
            mcp_manifest,
        }))
    }
}

/// Initialized Looker tool. The resolved source handle is held for its lifetime.
#[derive(Debug)]
pub struct LookerTool<O> {
    config: BasicToolConfig,
    op: O,
    params: ParamSpecs,
    handle: LookerHandle,
    manifest: Manifest,
    mcp_manifest: McpManifest,
}

#[async_trait]
impl<O: LookerOperation> Tool for LookerTool<O> {
    fn config(&self) -> &BasicToolConfig {
        &self.config
    }

    fn parse_params(&self, args: &Map<String, Value>, claims: &Claims) -> Result<ParamValues> {
        parameters::parse_params(&self.params, args, claims)
    }

    async fn embed_params(
        &self,
        values: ParamValues,
        models: &EmbeddingModels,
    ) -> Result<ParamValues> {
        parameters::embed_params(&self.params, values, models).await
    }

    async fn invoke(
        &self,
        _sources: &SourceRegistry,
        params: &ParamValues,
        access_token: Option<&AccessToken>,
    ) -> Result<ToolOutput> {
        let client = self.handle.client_for(access_token)?;
        self.op.run(client.as_ref(), params).await
    }

    fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn mcp_manifest(&self) -> &McpManifest {
        &self.mcp_manifest
    }

    fn requires_client_authorization(&self, _sources: &SourceRegistry) -> Result<bool> {
        Ok(self.handle.use_client_oauth)
    }

    fn auth_token_header_name(&self, _sources: &SourceRegistry) -> Result<String> {
        Ok(self.handle.auth_header_name.clone())
    }
}

/// Add every Looker tool kind.
pub fn register(registry: &mut ToolKindRegistry) -> Result<()> {
    registry.try_register(CreateModelSet::KIND, LookerToolConfig::<CreateModelSet>::factory)?;
    registry.try_register(
        CreatePermissionSet::KIND,
        LookerToolConfig::<CreatePermissionSet>::factory,
    )?;
    registry.try_register(CreateRole::KIND, LookerToolConfig::<CreateRole>::factory)?;
    registry.try_register(
        GetAllPermissions::KIND,
        LookerToolConfig::<GetAllPermissions>::factory,
    )?;
    registry.try_register(
        SearchPermissionSets::KIND,
        LookerToolConfig::<SearchPermissionSets>::factory,
    )?;
    registry.try_register(SearchRoles::KIND, LookerToolConfig::<SearchRoles>::factory)?;
    Ok(())
}

// =============================================================================
// Shared helpers
// =============================================================================

fn model_set_record(set: ModelSet) -> Record {
    RecordBuilder::new()
        .field("id", set.id)
        .field("name", set.name)
        .field("models", set.models)
        .field("all_access", set.all_access)
        .build()
}

fn permission_set_record(set: PermissionSet) -> Record {
    RecordBuilder::new()
        .field("id", set.id)
        .field("name", set.name)
        .field("permissions", set.permissions)
        .field("all_access", set.all_access)
        .build()
}

/// Query for a raw search endpoint. Empty strings are never sent as filters.
fn search_query(fields: &str, params: &ParamValues, string_filters: &[&str]) -> QueryParams {
    let mut query = QueryParams::new();
    query.insert("fields".to_string(), fields.to_string());
    for key in string_filters {
        if let Some(value) = params.non_empty_str(key) {
            query.insert((*key).to_string(), value.to_string());
        }
    }
    for key in ["id", "limit", "offset"] {
        if let Some(value) = params.get_int(key) {
            query.insert(key.to_string(), value.to_string());
        }
    }
    query
}

/// GET a raw search endpoint and decode the rows.
async fn search<T: DeserializeOwned>(
    client: &dyn LookerApi,
    path: &str,
    query: &QueryParams,
    operation: &str,
) -> Result<Vec<T>> {
    debug!(path, ?query, "looker search");
    let body = client
        .call(Method::GET, RAW_API_VERSION, path, query)
        .await
        .map_err(|e| Error::vendor(operation, e))?;
    serde_json::from_value(body).map_err(|e| Error::vendor(operation, LookerError::Decode(e)))
}
