//! Kind registries: plugin kind string to config-decoding factory.
//!
//! Registration happens once, during single-threaded startup, before any
//! document is decoded. Afterwards the registries are only read.

use crate::sources::SourceConfig;
use crate::tools::ToolConfig;
use crate::types::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

pub type ToolConfigFactory = fn(&str, serde_yaml::Value) -> Result<Box<dyn ToolConfig>>;
pub type SourceConfigFactory = fn(&str, serde_yaml::Value) -> Result<Box<dyn SourceConfig>>;

pub type ToolKindRegistry = KindRegistry<ToolConfigFactory>;
pub type SourceKindRegistry = KindRegistry<SourceConfigFactory>;

/// One factory per kind.
pub struct KindRegistry<F> {
    factories: HashMap<String, F>,
}

impl<F> KindRegistry<F> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Returns false, keeping the existing factory, if `kind` is taken.
    pub fn register(&mut self, kind: &str, factory: F) -> bool {
        if self.factories.contains_key(kind) {
            return false;
        }
        self.factories.insert(kind.to_string(), factory);
        debug!(kind, "registered kind");
        true
    }

    /// [`register`](Self::register), with a taken kind as [`Error::DuplicateKind`].
    pub fn try_register(&mut self, kind: &str, factory: F) -> Result<()> {
        if self.register(kind, factory) {
            Ok(())
        } else {
            Err(Error::DuplicateKind(kind.to_string()))
        }
    }

    pub fn lookup(&self, kind: &str) -> Option<&F> {
        self.factories.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Decode every record of one document section by its `kind` field.
    pub(crate) fn decode_section<T>(
        &self,
        section: &str,
        doc: &serde_yaml::Mapping,
        decode: impl Fn(&F, &str, serde_yaml::Value) -> Result<T>,
    ) -> Result<BTreeMap<String, T>> {
        let mut decoded = BTreeMap::new();
        for (key, value) in doc {
            let name = key.as_str().ok_or_else(|| {
                Error::config_decode(format!("{} names must be strings, got {:?}", section, key))
            })?;
            let record = value.as_mapping().ok_or_else(|| {
                Error::config_decode(format!("{} {:?} must be a mapping", section, name))
            })?;
            let kind = match record.get("kind") {
                None | Some(serde_yaml::Value::Null) => {
                    return Err(Error::config_validation(format!(
                        "{} {:?} is missing required field \"kind\"",
                        section, name
                    )))
                }
                Some(kind) => kind.as_str().ok_or_else(|| {
                    Error::config_decode(format!(
                        "{} {:?} has non-string kind {:?}",
                        section, name, kind
                    ))
                })?,
            };
            let factory = self
                .lookup(kind)
                .ok_or_else(|| Error::UnknownKind(format!("{} {:?} has kind {:?}", section, name, kind)))?;
            decoded.insert(name.to_string(), decode(factory, name, value.clone())?);
        }
        Ok(decoded)
    }
}

impl<F> Default for KindRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for KindRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Tool and source kind registries for one toolbox.
#[derive(Debug, Default)]
pub struct Registries {
    pub tools: ToolKindRegistry,
    pub sources: SourceKindRegistry,
}

impl Registries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every built-in source and tool kind.
    pub fn builtin() -> Result<Self> {
        let mut registries = Self::empty();
        crate::sources::looker::register(&mut registries.sources)?;
        crate::tools::looker::register(&mut registries.tools)?;
        info!(
            sources = registries.sources.len(),
            tools = registries.tools.len(),
            "registered built-in kinds"
        );
        Ok(registries)
    }
}
