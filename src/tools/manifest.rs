//! Published tool descriptions.
//!
//! [`Manifest`] is what the invocation host reads to bind arguments and check
//! auth; [`McpManifest`] is the Model Context Protocol listing entry.
//! Both are computed once at initialization and never change afterwards.

use super::config::{BasicToolConfig, ToolAnnotations};
use crate::parameters::{ParamSpecs, ParameterManifest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const META_AUTH_INVOKE: &str = "toolbox/authInvoke";
const META_AUTH_PARAM: &str = "toolbox/authParam";

/// Execution manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub description: String,
    pub parameters: Vec<ParameterManifest>,
    pub auth_required: Vec<String>,
}

impl Manifest {
    pub fn build(config: &BasicToolConfig, params: &ParamSpecs) -> Self {
        Self {
            description: config.description.clone(),
            parameters: params.manifest(),
            auth_required: config.auth_required.clone(),
        }
    }
}

/// MCP tool listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpManifest {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
    #[serde(rename = "_meta", default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl McpManifest {
    pub fn build(
        config: &BasicToolConfig,
        params: &ParamSpecs,
        annotations: ToolAnnotations,
    ) -> Self {
        let mut meta = Map::new();
        if !config.auth_required.is_empty() {
            meta.insert(META_AUTH_INVOKE.to_string(), json!(config.auth_required));
        }

        let auth_params: Map<String, Value> = params
            .iter()
            .filter(|p| p.is_auth_bound())
            .map(|p| {
                let services: Vec<&str> =
                    p.auth_services.iter().map(|a| a.name.as_str()).collect();
                (p.name.clone(), json!(services))
            })
            .collect();
        if !auth_params.is_empty() {
            meta.insert(META_AUTH_PARAM.to_string(), Value::Object(auth_params));
        }

        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            input_schema: params.mcp_input_schema(),
            annotations: Some(annotations),
            meta,
        }
    }
}
