use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Analyzer configuration.
///
/// Every field is optional in YAML; missing fields keep their defaults.
///
/// ```yaml
/// context_type: gin.Context
/// router_types: [gin.Engine, gin.RouterGroup]
/// success_text: OK
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Resolved type name of the per-request context parameter
    pub context_type: String,
    /// Resolved type names of router / route group parameters
    pub router_types: Vec<String>,
    /// Import path that marks a file as using the framework
    pub framework_import: String,
    /// `@Param` name used when a binding has no variable name
    pub default_param_name: String,
    /// Quoted text of the `@Success` directive
    pub success_text: String,
    /// Quoted text of every `@Param` directive
    pub param_description: String,
    /// Handlers with at least this many doc comment lines count as documented
    pub annotated_threshold: usize,
    /// Directory names never scanned
    pub skip_dirs: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            context_type: "gin.Context".to_string(),
            router_types: vec!["gin.Engine".to_string(), "gin.RouterGroup".to_string()],
            framework_import: "github.com/gin-gonic/gin".to_string(),
            default_param_name: "data".to_string(),
            success_text: "成功".to_string(),
            param_description: "请求参数".to_string(),
            annotated_threshold: 5,
            skip_dirs: vec!["vendor".to_string(), "testdata".to_string()],
        }
    }
}

impl AnalyzerConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn is_router_type(&self, type_name: &str) -> bool {
        self.router_types.iter().any(|t| t == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AnalyzerConfig::from_yaml_str(
            "success_text: OK\nrouter_types:\n  - gin.IRouter\n",
        )
        .unwrap();

        assert_eq!(config.success_text, "OK");
        assert_eq!(config.router_types, vec!["gin.IRouter"]);
        assert_eq!(config.context_type, "gin.Context");
        assert_eq!(config.default_param_name, "data");
        assert_eq!(config.annotated_threshold, 5);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = AnalyzerConfig::from_yaml_str("annotated_threshold: [1, 2");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "context_type: echo.Context").unwrap();

        let config = AnalyzerConfig::load(file.path()).unwrap();
        assert_eq!(config.context_type, "echo.Context");
        assert!(config.is_router_type("gin.Engine"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = AnalyzerConfig::load(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
