//! Configuration management for the bridge.
//!
//! This module provides configuration loading through TOML files and
//! environment variable overrides via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use cmdbridge::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! // Load configuration from TOML
//! let mut loader = ConfigurationLoader::new(Some(Path::new("config/cmdbridge.toml"))).unwrap();
//!
//! // Environment variables win over the file
//! EnvironmentLoader::new(None).apply(&mut loader.config);
//!
//! println!("Denylist: {:?}", loader.config.pipeline.postprocessor_denylist);
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{BridgeConfig, ConfigurationLoader, LoggingConfig};
pub use self::environment::EnvironmentLoader;
