//! Configuration structures.
//!
//! Two documents are involved: the process-level [`Config`] (logging, HTTP
//! defaults) and the [`ToolboxFile`] that declares sources and tools by name.
//! Records inside `ToolboxFile` stay as raw YAML until the factory registered
//! for their `kind` decodes them.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Global process configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Vendor HTTP defaults.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Defaults applied to vendor HTTP clients when a source does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// User-Agent sent with every vendor request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            user_agent: concat!("looker-toolbox/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The declarative toolbox document: named sources and named tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolboxFile {
    #[serde(default)]
    pub sources: serde_yaml::Mapping,

    #[serde(default)]
    pub tools: serde_yaml::Mapping,
}

impl ToolboxFile {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_decode(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_when_empty() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
        assert_eq!(config.http.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_humantime_timeout() {
        let config = Config::from_yaml_str(
            "http:\n  timeout: 30s\n  user_agent: test-agent\n",
        )
        .unwrap();
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.http.user_agent, "test-agent");
    }

    #[test]
    fn test_toolbox_file_keeps_raw_records() {
        let file = ToolboxFile::from_yaml_str(
            r#"
sources:
  my-looker:
    kind: looker
tools:
  list_permissions:
    kind: looker-get-all-permissions
    source: my-looker
    description: List permissions
"#,
        )
        .unwrap();
        assert_eq!(file.sources.len(), 1);
        assert_eq!(file.tools.len(), 1);
    }

    #[test]
    fn test_toolbox_file_rejects_unknown_section() {
        let err = ToolboxFile::from_yaml_str("widgets: {}\n").unwrap_err();
        assert!(matches!(err, Error::ConfigDecode(_)));
    }

    #[tokio::test]
    async fn test_toolbox_file_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        tokio::fs::write(&path, "tools: {}\n").await.unwrap();

        let file = ToolboxFile::load(&path).await.unwrap();
        assert!(file.tools.is_empty());
        assert!(file.sources.is_empty());
    }

    #[tokio::test]
    async fn test_toolbox_file_load_missing() {
        let err = ToolboxFile::load("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, Error::ConfigDecode(_)));
    }
}
