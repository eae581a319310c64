//! The priority-ordered conversion table.

use crate::conversion::ConversionConfig;
use crate::foreign::ForeignType;
use crate::types::NativeType;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Priority constants. Higher runs first.
pub mod priority {
    /// Absolutely first.
    pub const FIRST: i32 = i32::MAX;
    /// Far above everything ordinary.
    pub const EXTREMELY_HIGH: i32 = 1_000_000;
    /// Well above normal.
    pub const VERY_HIGH: i32 = 10_000;
    /// Above normal.
    pub const HIGH: i32 = 100;
    /// The default.
    pub const NORMAL: i32 = 0;
    /// Below normal.
    pub const LOW: i32 = -100;
    /// Well below normal.
    pub const VERY_LOW: i32 = -10_000;
    /// Far below everything ordinary.
    pub const EXTREMELY_LOW: i32 = -1_000_000;
    /// Absolutely last.
    pub const LAST: i32 = i32::MIN;
}

/// Groups of related entries. Declaration order is the category rank.
///
/// `Boolean` ranks before `Number` so that a boolean foreign type is never
/// captured by a numeric entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Boolean scalars.
    Boolean,
    /// Numeric scalars.
    Number,
    /// Characters and strings.
    String,
    /// Label maps.
    Label,
    /// Images.
    Image,
    /// Point collections.
    Point,
    /// Regions of interest.
    Shape,
    /// Meshes.
    Surface,
    /// Particle tracks.
    Track,
    /// Color lookup tables.
    ColorTable,
    /// Tabular data.
    Table,
    /// Filesystem paths.
    Path,
    /// Enumerations.
    Enum,
    /// Dates and times.
    Date,
    /// Anything host-specific.
    Other,
}

/// One row of the conversion table.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionEntry {
    category: Category,
    foreign_type: ForeignType,
    native_type: NativeType,
    priority: i32,
}

impl ConversionEntry {
    /// Entry category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The foreign side of the pair.
    pub fn foreign_type(&self) -> &ForeignType {
        &self.foreign_type
    }

    /// The native side of the pair.
    pub fn native_type(&self) -> &NativeType {
        &self.native_type
    }

    /// Priority within the category.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// The full, sorted conversion table.
///
/// Built once through [`ConversionRegistryBuilder`] and immutable afterwards.
/// Inputs are matched scanning [`forward`](Self::forward); outputs scanning
/// [`reverse`](Self::reverse).
///
/// # Example
///
/// ```
/// use cmdbridge::conversion::{priority, Category, ConversionRegistry};
/// use cmdbridge::types::NativeType;
///
/// let mut builder = ConversionRegistry::builder();
/// builder
///     .register(Category::Number, "java.lang.Integer", NativeType::Int, priority::NORMAL)
///     .register(Category::Boolean, "java.lang.Boolean", NativeType::Bool, priority::NORMAL);
/// let registry = builder.build();
///
/// // booleans sort ahead of numbers regardless of registration order
/// assert_eq!(registry.entries()[0].native_type(), &NativeType::Bool);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConversionRegistry {
    entries: Vec<ConversionEntry>,
}

impl ConversionRegistry {
    /// Start an empty builder.
    pub fn builder() -> ConversionRegistryBuilder {
        ConversionRegistryBuilder::default()
    }

    /// The standard table.
    pub fn standard(config: &ConversionConfig) -> Self {
        let mut builder = Self::builder();
        crate::conversion::standard::register_standard(&mut builder, config);
        builder.build()
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[ConversionEntry] {
        &self.entries
    }

    /// Entries, most specific first.
    pub fn forward(&self) -> impl Iterator<Item = &ConversionEntry> {
        self.entries.iter()
    }

    /// Entries, least specific first.
    pub fn reverse(&self) -> impl Iterator<Item = &ConversionEntry> {
        self.entries.iter().rev()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether some entry names exactly `ty`.
    pub fn contains(&self, ty: &ForeignType) -> bool {
        self.entries.iter().any(|e| &e.foreign_type == ty)
    }
}

/// Collects entries for a [`ConversionRegistry`].
#[derive(Clone, Debug, Default)]
pub struct ConversionRegistryBuilder {
    pending: Vec<ConversionEntry>,
}

impl ConversionRegistryBuilder {
    /// Register one entry.
    pub fn register(
        &mut self,
        category: Category,
        foreign_type: impl Into<ForeignType>,
        native_type: NativeType,
        priority: i32,
    ) -> &mut Self {
        self.pending.push(ConversionEntry {
            category,
            foreign_type: foreign_type.into(),
            native_type,
            priority,
        });
        self
    }

    /// Register several foreign types mapping to the same native type.
    pub fn register_all<'a>(
        &mut self,
        category: Category,
        foreign_types: impl IntoIterator<Item = &'a str>,
        native_type: NativeType,
        priority: i32,
    ) -> &mut Self {
        for ty in foreign_types {
            self.register(category, ty, native_type.clone(), priority);
        }
        self
    }

    /// Sort by category rank, then descending priority; ties keep
    /// registration order.
    pub fn build(&self) -> ConversionRegistry {
        let mut entries = self.pending.clone();
        entries.sort_by_key(|e| (e.category, Reverse(e.priority)));
        tracing::debug!(entries = entries.len(), "built conversion registry");
        ConversionRegistry { entries }
    }
}
