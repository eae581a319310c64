//! Sources that enumerate commands for the catalog.

use crate::catalog::{CatalogError, CommandCatalog, CommandDescriptor};
use std::sync::Arc;

/// A provider of command descriptors, typically backed by the foreign
/// runtime's plugin index.
///
/// # Object Safety
///
/// This trait is object-safe and can be used with `dyn CommandSource`.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::{
///     CatalogError, CommandCatalog, CommandDescriptor, CommandSource, DefaultCommandCatalog,
/// };
///
/// struct Builtins;
///
/// impl CommandSource for Builtins {
///     fn name(&self) -> &str {
///         "builtins"
///     }
///
///     fn discover(&self) -> Result<Vec<CommandDescriptor>, CatalogError> {
///         Ok(vec![CommandDescriptor::new("math.add", "Add")])
///     }
/// }
///
/// let mut catalog = DefaultCommandCatalog::new();
/// assert_eq!(Builtins.register_all(&mut catalog).unwrap(), 1);
/// ```
pub trait CommandSource {
	/// Name used in logs and errors.
	fn name(&self) -> &str;

	/// Enumerate the commands this source provides.
	fn discover(&self) -> Result<Vec<CommandDescriptor>, CatalogError>;

	/// Catalog every discovered command.
	///
	/// Stops at the first duplicate identifier.
	fn register_all(&self, catalog: &mut dyn CommandCatalog) -> Result<usize, CatalogError> {
		let descriptors = self.discover()?;
		let count = descriptors.len();
		for descriptor in descriptors {
			catalog.register(Arc::new(descriptor))?;
		}
		tracing::debug!(source = self.name(), count, "catalogued commands");
		Ok(count)
	}

	/// Catalog every discovered command, skipping duplicates.
	///
	/// Returns the number of commands actually added.
	fn register_all_skip_duplicates(
		&self,
		catalog: &mut dyn CommandCatalog,
	) -> Result<usize, CatalogError> {
		let descriptors = self.discover()?;
		let mut count = 0;
		for descriptor in descriptors {
			match catalog.register(Arc::new(descriptor)) {
				Ok(()) => count += 1,
				Err(e) => tracing::debug!(source = self.name(), error = %e, "skipped command"),
			}
		}
		Ok(count)
	}
}

/// A source that returns a fixed list of descriptors.
#[derive(Debug, Clone)]
pub struct StaticSource {
	name: String,
	descriptors: Vec<CommandDescriptor>,
}

impl StaticSource {
	/// Create a source with the given descriptors.
	pub fn new(name: impl Into<String>, descriptors: Vec<CommandDescriptor>) -> Self {
		Self {
			name: name.into(),
			descriptors,
		}
	}

	/// Create an empty source.
	pub fn empty(name: impl Into<String>) -> Self {
		Self::new(name, Vec::new())
	}

	/// Add a descriptor to this source.
	pub fn add(&mut self, descriptor: CommandDescriptor) {
		self.descriptors.push(descriptor);
	}

	/// Number of descriptors held.
	pub fn len(&self) -> usize {
		self.descriptors.len()
	}

	/// Check if this source is empty.
	pub fn is_empty(&self) -> bool {
		self.descriptors.is_empty()
	}
}

impl CommandSource for StaticSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn discover(&self) -> Result<Vec<CommandDescriptor>, CatalogError> {
		Ok(self.descriptors.clone())
	}
}
