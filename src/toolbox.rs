//! Toolbox assembly: decode, connect, initialize, then serve invocations.

use crate::parameters::{EmbeddingModel, EmbeddingModels};
use crate::registry::Registries;
use crate::sources::{decode_source_configs, SourceRegistry};
use crate::tools::{
    decode_tool_configs, invoke_tool, InvocationRequest, Manifest, McpManifest, Tool, ToolConfigs,
    ToolOutput,
};
use crate::types::{Config, Error, Result, ToolboxFile};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Initialized sources and tools. Read-only once built.
pub struct Toolbox {
    sources: SourceRegistry,
    tools: BTreeMap<String, Arc<dyn Tool>>,
    embedding_models: EmbeddingModels,
}

impl fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut models: Vec<&String> = self.embedding_models.keys().collect();
        models.sort();
        f.debug_struct("Toolbox")
            .field("sources", &self.sources.names())
            .field("tools", &self.tool_names())
            .field("embedding_models", &models)
            .finish()
    }
}

impl Toolbox {
    /// Decode `file`, connect every source, and initialize every tool.
    ///
    /// Any decode, validation, or resolution failure aborts the whole build.
    pub async fn from_file(
        registries: &Registries,
        file: &ToolboxFile,
        config: &Config,
    ) -> Result<Self> {
        let source_configs = decode_source_configs(&registries.sources, &file.sources)?;
        let tool_configs = decode_tool_configs(&registries.tools, &file.tools)?;

        let initialized = try_join_all(source_configs.values().map(|source| async move {
            let connected = source.initialize(&config.http).await?;
            Ok::<_, Error>((source.name().to_string(), connected))
        }))
        .await?;

        let mut sources = SourceRegistry::new();
        for (name, source) in initialized {
            sources.insert(name, source);
        }

        Self::from_parts(sources, &tool_configs)
    }

    /// Initialize `tool_configs` against already connected sources.
    pub fn from_parts(sources: SourceRegistry, tool_configs: &ToolConfigs) -> Result<Self> {
        let mut tools = BTreeMap::new();
        for (name, config) in tool_configs {
            tools.insert(name.clone(), config.initialize(&sources)?);
        }
        info!(
            sources = sources.len(),
            tools = tools.len(),
            "toolbox initialized"
        );
        Ok(Self {
            sources,
            tools,
            embedding_models: EmbeddingModels::new(),
        })
    }

    pub fn with_embedding_model(
        mut self,
        name: impl Into<String>,
        model: Arc<dyn EmbeddingModel>,
    ) -> Self {
        self.embedding_models.insert(name.into(), model);
        self
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn manifests(&self) -> BTreeMap<String, Manifest> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.manifest().clone()))
            .collect()
    }

    pub fn mcp_manifests(&self) -> Vec<McpManifest> {
        self.tools
            .values()
            .map(|tool| tool.mcp_manifest().clone())
            .collect()
    }

    /// Invoke tool `name`. Checking `authRequired` is the host's job.
    pub async fn invoke(
        &self,
        name: &str,
        request: &InvocationRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        invoke_tool(
            tool.as_ref(),
            &self.sources,
            &self.embedding_models,
            request,
            cancel,
        )
        .await
    }
}
