//! Tool configuration decoding.

use super::ToolConfig;
use crate::registry::ToolKindRegistry;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decoded tool declarations by instance name.
pub type ToolConfigs = BTreeMap<String, Box<dyn ToolConfig>>;

/// Hints published with the protocol manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl ToolAnnotations {
    pub fn read_only(read_only: bool) -> Self {
        Self {
            read_only_hint: Some(read_only),
            ..Self::default()
        }
    }
}

/// Fields every tool kind shares. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicToolConfig {
    pub name: String,
    pub kind: String,
    pub source: String,
    pub description: String,
    pub auth_required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawToolConfig {
    // Accepted for compatibility; the map key always wins.
    #[serde(default)]
    #[allow(dead_code)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    auth_required: Vec<String>,
    #[serde(default)]
    annotations: Option<ToolAnnotations>,
}

impl BasicToolConfig {
    /// Decode one tool record declared under `name`.
    pub fn decode(name: &str, value: serde_yaml::Value) -> Result<Self> {
        let raw: RawToolConfig = serde_yaml::from_value(value)
            .map_err(|e| Error::config_decode(format!("unable to parse tool {:?}: {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            kind: required_field(name, "kind", raw.kind)?,
            source: required_field(name, "source", raw.source)?,
            description: required_field(name, "description", raw.description)?,
            auth_required: raw.auth_required,
            annotations: raw.annotations,
        })
    }

    /// Configured annotations, with `readOnlyHint` filled from the kind's default.
    pub fn annotations_or_default(&self, read_only: bool) -> ToolAnnotations {
        let mut annotations = self.annotations.clone().unwrap_or_default();
        annotations.read_only_hint.get_or_insert(read_only);
        annotations
    }
}

fn required_field(tool: &str, field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::config_validation(format!(
            "tool {:?} is missing required field {:?}",
            tool, field
        ))),
    }
}

/// Decode the `tools` section, dispatching each record on its `kind`.
pub fn decode_tool_configs(
    registry: &ToolKindRegistry,
    tools: &serde_yaml::Mapping,
) -> Result<ToolConfigs> {
    registry.decode_section("tool", tools, |factory, name, value| factory(name, value))
}
