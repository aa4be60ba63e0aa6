//! Parameter schema: typed declarations, binding, and manifest projections.
//!
//! A tool declares its inputs once as a [`ParamSpecs`] list. The same list
//! drives argument binding ([`parse_params`]), the optional embedding step
//! ([`embed_params`]), and both manifest forms.

mod embedding;
mod values;

pub use embedding::{embed_params, EmbeddingModel, EmbeddingModels};
pub use values::{parse_params, Claims, ParamValue, ParamValues};

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

// =============================================================================
// Parameter kinds
// =============================================================================

/// Value kind accepted by a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String,
    Int,
    Float,
    Bool,
    /// Homogeneous list; the boxed spec describes one element.
    Array(Box<ParamSpec>),
}

impl ParamKind {
    /// Type name used by both manifests.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Int => "integer",
            ParamKind::Float => "float",
            ParamKind::Bool => "boolean",
            ParamKind::Array(_) => "array",
        }
    }

    // JSON Schema has no "float".
    fn json_schema_type(&self) -> &'static str {
        match self {
            ParamKind::Float => "number",
            other => other.type_name(),
        }
    }
}

/// Claim lookup for a parameter whose value comes from a verified auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamAuthService {
    pub name: String,
    pub field: String,
}

// =============================================================================
// Parameter spec
// =============================================================================

/// One declared input argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub auth_services: Vec<ParamAuthService>,
    /// Embedding model applied to this parameter's value, if any.
    pub embedded_by: Option<String>,
}

impl ParamSpec {
    fn new(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default: None,
            auth_services: Vec::new(),
            embedded_by: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn int(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int, description)
    }

    pub fn float(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Float, description)
    }

    pub fn bool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool, description)
    }

    pub fn array(
        name: impl Into<String>,
        description: impl Into<String>,
        items: ParamSpec,
    ) -> Self {
        Self::new(name, ParamKind::Array(Box::new(items)), description)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// A default makes the parameter optional.
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn with_auth_service(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.auth_services.push(ParamAuthService {
            name: name.into(),
            field: field.into(),
        });
        self
    }

    pub fn embedded_by(mut self, model: impl Into<String>) -> Self {
        self.embedded_by = Some(model.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required && self.default.is_none()
    }

    pub fn is_auth_bound(&self) -> bool {
        !self.auth_services.is_empty()
    }

    /// Execution-manifest projection.
    pub fn manifest(&self) -> ParameterManifest {
        let items = match &self.kind {
            ParamKind::Array(item) => Some(Box::new(item.manifest())),
            _ => None,
        };
        ParameterManifest {
            name: self.name.clone(),
            kind: self.kind.type_name().to_string(),
            required: self.is_required(),
            description: self.description.clone(),
            auth_sources: self.auth_services.iter().map(|a| a.name.clone()).collect(),
            items,
            default: self.default.as_ref().map(ParamValue::to_json),
        }
    }

    /// JSON Schema fragment for the protocol manifest's `inputSchema`.
    pub fn mcp_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.kind.json_schema_type()));
        schema.insert("description".into(), json!(self.description));
        if let ParamKind::Array(item) = &self.kind {
            schema.insert("items".into(), item.mcp_schema());
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.to_json());
        }
        Value::Object(schema)
    }
}

/// Serializable parameter projection consumed by the invocation host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub description: String,
    #[serde(default)]
    pub auth_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterManifest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

// =============================================================================
// Parameter list
// =============================================================================

/// Ordered parameter list with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSpecs(Vec<ParamSpec>);

impl ParamSpecs {
    pub fn new(specs: Vec<ParamSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.name.is_empty() {
                return Err(Error::config_validation("parameter name cannot be empty"));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::config_validation(format!(
                    "duplicate parameter name: {}",
                    spec.name
                )));
            }
        }
        Ok(Self(specs))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn manifest(&self) -> Vec<ParameterManifest> {
        self.0.iter().map(ParamSpec::manifest).collect()
    }

    /// `{type: object, properties, required}` for the protocol manifest.
    ///
    /// Auth-bound parameters are filled from claims, never by the caller, so
    /// they are left out of the schema.
    pub fn mcp_input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in self.0.iter().filter(|p| !p.is_auth_bound()) {
            properties.insert(spec.name.clone(), spec.mcp_schema());
            if spec.is_required() {
                required.push(Value::String(spec.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl<'a> IntoIterator for &'a ParamSpecs {
    type Item = &'a ParamSpec;
    type IntoIter = std::slice::Iter<'a, ParamSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
