//! Command catalog - discovered foreign commands and their metadata.
//!
//! Discovery collaborators describe each foreign command once, as an
//! immutable [`CommandDescriptor`]. Descriptors are gathered from one or more
//! [`CommandSource`]s into a [`CommandCatalog`], and from there handed to the
//! [`Bridge`](crate::Bridge) to be wrapped into invocables.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ plugin index │   │ static list  │
//! └──────┬───────┘   └──────┬───────┘
//!        ▼                  ▼
//! ┌─────────────────────────────────┐
//! │       CommandSource trait       │
//! └────────────────┬────────────────┘
//!                  ▼
//! ┌─────────────────────────────────┐
//! │ CommandCatalog (Arc<Descriptor>)│
//! └────────────────┬────────────────┘
//!                  ▼
//!            Bridge::wrap
//! ```
//!
//! # Example
//!
//! ```
//! use cmdbridge::catalog::{
//!     CommandCatalog, CommandDescriptor, CommandSource, DefaultCommandCatalog,
//!     ParameterDescriptor, StaticSource,
//! };
//!
//! let source = StaticSource::new(
//!     "builtins",
//!     vec![CommandDescriptor::new("filter.gauss", "Gaussian Blur")
//!         .with_parameter(ParameterDescriptor::input("sigma", "java.lang.Double"))],
//! );
//!
//! let mut catalog = DefaultCommandCatalog::new();
//! source.register_all(&mut catalog).unwrap();
//! assert_eq!(catalog.search("gauss").len(), 1);
//! ```

mod descriptor;
mod direction;
mod error;
mod registry;
mod source;

pub use descriptor::{CommandDescriptor, ParameterDescriptor, UiHints};
pub use direction::Direction;
pub use error::CatalogError;
pub use registry::{CommandCatalog, DefaultCommandCatalog};
pub use source::{CommandSource, StaticSource};

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

use serde::{Deserialize, Serialize};

/// Limits applied to background command search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
	/// Results kept per search source.
	#[serde(default = "default_max_results_per_source")]
	pub max_results_per_source: usize,
}

fn default_max_results_per_source() -> usize {
	100
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			max_results_per_source: default_max_results_per_source(),
		}
	}
}
