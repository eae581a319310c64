//! TOML configuration parsing and management.

use crate::bridge::BridgeBuilder;
use crate::catalog::SearchConfig;
use crate::conversion::ConversionConfig;
use crate::pipeline::PipelineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Standard conversion table options.
    #[serde(default)]
    pub conversion: ConversionConfig,
    /// Session pipeline options.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Background search limits.
    #[serde(default)]
    pub search: SearchConfig,
    /// Invocation journal options.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Apply the conversion and pipeline sections to a bridge builder.
    pub fn configure(&self, builder: BridgeBuilder) -> BridgeBuilder {
        builder
            .conversion(self.conversion.clone())
            .pipeline(self.pipeline.clone())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Journal file; a temp directory is used when unset.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Minimum level written to the journal.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// Where the configuration came from, if a file was read.
    pub config_path: Option<PathBuf>,
    /// The loaded configuration.
    pub config: BridgeConfig,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, the user config
    ///   directory is tried, then the built-in defaults.
    ///
    /// An explicit path that does not exist is an error.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let config = match &config_path {
            Some(path) => Self::load_config(path)?,
            None => BridgeConfig::default(),
        };

        tracing::debug!(
            path = ?config_path,
            denylist = ?config.pipeline.postprocessor_denylist,
            "configuration loaded"
        );
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed configuration.
    pub fn from_config(config: BridgeConfig) -> Self {
        Self {
            config_path: None,
            config,
        }
    }

    /// `<user config dir>/cmdbridge/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cmdbridge").join("config.toml"))
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<BridgeConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "pipeline.postprocess_failure" => {
                Some(self.config.pipeline.postprocess_failure.to_string())
            }
            "logging.log_file" => self.config.logging.log_file.clone(),
            "logging.log_level" => Some(self.config.logging.log_level.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "search.max_results_per_source" => {
                Some(self.config.search.max_results_per_source as u64)
            }
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "conversion.include_legacy_images" => Some(self.config.conversion.include_legacy_images),
            "pipeline.display_results_in_new_window" => {
                Some(self.config.pipeline.display_results_in_new_window)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PostprocessFailurePolicy;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.conversion.include_legacy_images);
        assert_eq!(
            config.pipeline.postprocessor_denylist,
            vec!["DisplayPostprocessor".to_string()]
        );
        assert_eq!(
            config.pipeline.postprocess_failure,
            PostprocessFailurePolicy::FailFast
        );
        assert!(!config.pipeline.display_results_in_new_window);
        assert_eq!(config.search.max_results_per_source, 100);
        assert_eq!(config.logging.log_level, "INFO");
        assert!(config.logging.log_file.is_none());
    }

    #[test]
    fn test_full_config_from_toml() {
        let toml_content = r#"
[conversion]
include_legacy_images = false

[pipeline]
postprocessor_denylist = ["DisplayPostprocessor", "SaveAsPostprocessor"]
postprocess_failure = "isolate"
display_results_in_new_window = true

[search]
max_results_per_source = 25

[logging]
log_file = "/tmp/cmdbridge.md"
log_level = "DEBUG"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        let loader = ConfigurationLoader::new(Some(temp_file.path())).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(temp_file.path()));
        assert_eq!(loader.get_bool("conversion.include_legacy_images"), Some(false));
        assert_eq!(loader.get_bool("pipeline.display_results_in_new_window"), Some(true));
        assert_eq!(
            loader.get_string("pipeline.postprocess_failure"),
            Some("isolate".to_string())
        );
        assert_eq!(loader.get_u64("search.max_results_per_source"), Some(25));
        assert_eq!(
            loader.get_string("logging.log_file"),
            Some("/tmp/cmdbridge.md".to_string())
        );
        assert_eq!(loader.config.pipeline.postprocessor_denylist.len(), 2);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[search]\nmax_results_per_source = 5\n").unwrap();

        let loader = ConfigurationLoader::new(Some(temp_file.path())).unwrap();
        assert_eq!(loader.config.search.max_results_per_source, 5);
        assert_eq!(loader.config.pipeline, PipelineConfig::default());
        assert_eq!(loader.get_string("logging.log_level"), Some("INFO".to_string()));
        assert_eq!(loader.get_string("logging.log_file"), None);
        assert_eq!(loader.get_string("unknown.key"), None);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[pipeline\npostprocess_failure = ").unwrap();

        let err = ConfigurationLoader::new(Some(temp_file.path())).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            "[pipeline]\npostprocess_failure = \"retry\"\n",
        )
        .unwrap();
        assert!(ConfigurationLoader::new(Some(temp_file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ConfigurationLoader::new(Some(&missing)).is_err());
    }

    #[test]
    fn test_default_config_path_location() {
        if let Some(path) = ConfigurationLoader::default_config_path() {
            assert!(path.ends_with("cmdbridge/config.toml"));
        }
    }
}
