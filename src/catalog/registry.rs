//! Catalog trait and default implementation for discovered commands.

use crate::catalog::{CatalogError, CommandDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

/// A catalog of discovered command descriptors.
///
/// Descriptors are immutable once catalogued and are handed out as shared
/// `Arc`s, so a wrapped command keeps its descriptor alive even after it has
/// been removed from the catalog.
///
/// # Object Safety
///
/// This trait is object-safe and can be used with `dyn CommandCatalog`.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::{CommandCatalog, CommandDescriptor, DefaultCommandCatalog};
///
/// let mut catalog = DefaultCommandCatalog::new();
/// catalog.register(CommandDescriptor::new("math.add", "Add").into()).unwrap();
///
/// assert!(catalog.contains("math.add"));
/// assert_eq!(catalog.search("ADD").len(), 1);
/// ```
pub trait CommandCatalog {
	/// Catalog a descriptor.
	///
	/// Returns an error if a command with the same identifier already exists.
	fn register(&mut self, descriptor: Arc<CommandDescriptor>) -> Result<(), CatalogError>;

	/// Get a command by identifier.
	fn get(&self, identifier: &str) -> Option<Arc<CommandDescriptor>>;

	/// List all commands, ordered by identifier.
	fn list(&self) -> Vec<Arc<CommandDescriptor>>;

	/// Check if a command exists.
	fn contains(&self, identifier: &str) -> bool;

	/// Remove a command, returning it if it existed.
	fn remove(&mut self, identifier: &str) -> Option<Arc<CommandDescriptor>>;

	/// Get the number of catalogued commands.
	fn len(&self) -> usize;

	/// Check if the catalog is empty.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Get all identifiers.
	fn identifiers(&self) -> Vec<&str>;

	/// Commands whose title or identifier contains `query`, ignoring case.
	///
	/// A blank query matches nothing.
	fn search(&self, query: &str) -> Vec<Arc<CommandDescriptor>> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Vec::new();
		}
		self.list()
			.into_iter()
			.filter(|cmd| {
				cmd.title.to_lowercase().contains(&needle)
					|| cmd.identifier.to_lowercase().contains(&needle)
			})
			.collect()
	}
}

/// Default implementation of `CommandCatalog` using a HashMap.
#[derive(Debug, Default, Clone)]
pub struct DefaultCommandCatalog {
	commands: HashMap<String, Arc<CommandDescriptor>>,
}

impl DefaultCommandCatalog {
	/// Create a new empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Catalog a descriptor, replacing any existing one with the same identifier.
	pub fn register_or_replace(
		&mut self,
		descriptor: Arc<CommandDescriptor>,
	) -> Option<Arc<CommandDescriptor>> {
		self.commands.insert(descriptor.identifier.clone(), descriptor)
	}

	/// Get a command or fail with `NotFound`.
	pub fn require(&self, identifier: &str) -> Result<Arc<CommandDescriptor>, CatalogError> {
		self.get(identifier)
			.ok_or_else(|| CatalogError::not_found(identifier))
	}

	/// Remove all commands.
	pub fn clear(&mut self) {
		self.commands.clear();
	}
}

impl CommandCatalog for DefaultCommandCatalog {
	fn register(&mut self, descriptor: Arc<CommandDescriptor>) -> Result<(), CatalogError> {
		if self.commands.contains_key(&descriptor.identifier) {
			return Err(CatalogError::duplicate_identifier(&descriptor.identifier));
		}
		self.commands.insert(descriptor.identifier.clone(), descriptor);
		Ok(())
	}

	fn get(&self, identifier: &str) -> Option<Arc<CommandDescriptor>> {
		self.commands.get(identifier).cloned()
	}

	fn list(&self) -> Vec<Arc<CommandDescriptor>> {
		let mut commands: Vec<_> = self.commands.values().cloned().collect();
		commands.sort_by(|a, b| a.identifier.cmp(&b.identifier));
		commands
	}

	fn contains(&self, identifier: &str) -> bool {
		self.commands.contains_key(identifier)
	}

	fn remove(&mut self, identifier: &str) -> Option<Arc<CommandDescriptor>> {
		self.commands.remove(identifier)
	}

	fn len(&self) -> usize {
		self.commands.len()
	}

	fn identifiers(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
		ids.sort_unstable();
		ids
	}
}

impl FromIterator<CommandDescriptor> for DefaultCommandCatalog {
	fn from_iter<T: IntoIterator<Item = CommandDescriptor>>(iter: T) -> Self {
		let mut catalog = Self::new();
		for descriptor in iter {
			catalog.register_or_replace(Arc::new(descriptor));
		}
		catalog
	}
}
