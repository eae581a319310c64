//! Type conversion - mapping foreign types to native types.
//!
//! A [`ConversionRegistry`] pairs foreign types with native types in a fixed
//! priority order. A [`TypeResolver`] walks it with a list of
//! [`TypeChecker`]s to find the native type of a parameter:
//!
//! | checker                  | priority    | relation                    |
//! |--------------------------|-------------|-----------------------------|
//! | [`ExactTypeChecker`]     | `VERY_HIGH` | same foreign type           |
//! | [`AssignabilityChecker`] | `HIGH`      | assignable in the hierarchy |
//! | [`StandinChecker`]       | `NORMAL`    | standin table, inputs only  |
//! | [`ConversionChecker`]    | `LOW`       | runtime conversion exists   |
//!
//! Inputs scan the registry forward, outputs in reverse, in-place
//! parameters need a two-way match on one entry.

mod checkers;
mod registry;
mod resolver;
pub mod standard;

pub use checkers::{
    scan_registry, AssignabilityChecker, ConversionChecker, ExactTypeChecker, StandinChecker,
    TypeChecker,
};
pub use registry::{priority, Category, ConversionEntry, ConversionRegistry, ConversionRegistryBuilder};
pub use resolver::TypeResolver;

use serde::{Deserialize, Serialize};

/// Options for the standard conversion table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Register the legacy image type alongside the modern ones.
    #[serde(default = "default_include_legacy_images")]
    pub include_legacy_images: bool,
}

fn default_include_legacy_images() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            include_legacy_images: default_include_legacy_images(),
        }
    }
}
