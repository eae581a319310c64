//! Error types for the catalog module.

use thiserror::Error;

/// Errors that can occur while discovering or cataloguing commands.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::CatalogError;
///
/// let error = CatalogError::not_found("filter.gauss");
/// assert!(error.to_string().contains("filter.gauss"));
/// ```
#[derive(Debug, Error)]
pub enum CatalogError {
	/// The requested command is not in the catalog.
	#[error("command not found: {identifier}")]
	NotFound {
		/// Identifier that was looked up.
		identifier: String,
	},

	/// A command with the same identifier is already catalogued.
	#[error("command already registered: {identifier}")]
	DuplicateIdentifier {
		/// Identifier of the duplicate command.
		identifier: String,
	},

	/// A command source failed to enumerate its commands.
	#[error("discovery failed for {source_name}: {message}")]
	Discovery {
		/// Name of the failing source.
		source_name: String,
		/// Description of the failure.
		message: String,
	},
}

impl CatalogError {
	/// Create a NotFound error for the given identifier.
	pub fn not_found(identifier: impl Into<String>) -> Self {
		Self::NotFound {
			identifier: identifier.into(),
		}
	}

	/// Create a DuplicateIdentifier error for the given identifier.
	pub fn duplicate_identifier(identifier: impl Into<String>) -> Self {
		Self::DuplicateIdentifier {
			identifier: identifier.into(),
		}
	}

	/// Create a Discovery error.
	pub fn discovery(source_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Discovery {
			source_name: source_name.into(),
			message: message.into(),
		}
	}
}
