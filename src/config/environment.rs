//! Environment variable loading and management.
//!
//! Only a handful of settings can be overridden from the environment; they
//! are applied on top of a loaded [`BridgeConfig`].

use crate::config::BridgeConfig;
use crate::pipeline::PostprocessFailurePolicy;
use std::env;
use std::path::Path;

/// Overrides `conversion.include_legacy_images`.
pub const INCLUDE_LEGACY_IMAGES_VAR: &str = "CMDBRIDGE_INCLUDE_LEGACY_IMAGES";
/// Overrides `pipeline.postprocess_failure`.
pub const POSTPROCESS_FAILURE_VAR: &str = "CMDBRIDGE_POSTPROCESS_FAILURE";
/// Overrides `logging.log_level`.
pub const LOG_LEVEL_VAR: &str = "CMDBRIDGE_LOG_LEVEL";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded when None.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only load a .env file if an explicit path was provided.
        if let Some(env_path) = env_file {
            if env_path.exists() {
                if let Err(e) = dotenv::from_path(env_path) {
                    tracing::warn!(path = %env_path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file this loader was given.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// `CMDBRIDGE_INCLUDE_LEGACY_IMAGES`, accepting `1/0`, `true/false`,
    /// `yes/no` and `on/off`.
    pub fn include_legacy_images(&self) -> Option<bool> {
        let raw = env::var(INCLUDE_LEGACY_IMAGES_VAR).ok()?;
        match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                tracing::warn!(var = INCLUDE_LEGACY_IMAGES_VAR, value = %raw, "ignoring unparsable flag");
                None
            }
        }
    }

    /// `CMDBRIDGE_POSTPROCESS_FAILURE`: `fail_fast` or `isolate`.
    pub fn postprocess_failure(&self) -> Option<PostprocessFailurePolicy> {
        let raw = env::var(POSTPROCESS_FAILURE_VAR).ok()?;
        match raw.parse() {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!(var = POSTPROCESS_FAILURE_VAR, error = %e, "ignoring unknown policy");
                None
            }
        }
    }

    /// `CMDBRIDGE_LOG_LEVEL`, uppercased.
    pub fn log_level(&self) -> Option<String> {
        env::var(LOG_LEVEL_VAR)
            .ok()
            .map(|level| level.trim().to_uppercase())
            .filter(|level| !level.is_empty())
    }

    /// Apply every override that is set to `config`.
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(include) = self.include_legacy_images() {
            config.conversion.include_legacy_images = include;
        }
        if let Some(policy) = self.postprocess_failure() {
            config.pipeline.postprocess_failure = policy;
        }
        if let Some(level) = self.log_level() {
            config.logging.log_level = level;
        }
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
