//! Host-side types and values.

use crate::foreign::ForeignObject;
use crate::types::{StandinChoice, StandinKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Visual item kinds the host can display natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    /// Pixel data.
    Image,
    /// Integer label map.
    Labels,
    /// Point cloud.
    Points,
    /// Polygons, ellipses and other regions.
    Shapes,
    /// Triangle mesh.
    Surface,
    /// Particle tracks.
    Tracks,
}

impl DisplayKind {
    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Labels => "labels",
            Self::Points => "points",
            Self::Shapes => "shapes",
            Self::Surface => "surface",
            Self::Tracks => "tracks",
        }
    }
}

impl fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "Image",
            Self::Labels => "Labels",
            Self::Points => "Points",
            Self::Shapes => "Shapes",
            Self::Surface => "Surface",
            Self::Tracks => "Tracks",
        })
    }
}

/// The host-side type a foreign type is presented as.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `complex`
    Complex,
    /// `str`
    Str,
    /// Filesystem path.
    Path,
    /// Timestamp.
    DateTime,
    /// Member of a foreign enumeration.
    Enum,
    /// Lookup table mapping intensities to colors.
    ColorMap,
    /// Tabular data.
    Table,
    /// Homogeneous list.
    List(Box<NativeType>),
    /// A first-class displayable kind.
    Layer(DisplayKind),
    /// One of a fixed set of standin choices.
    Standin(StandinKind),
    /// An opaque foreign value with no host counterpart.
    ForeignObject,
    /// The inner type, or nothing.
    Optional(Box<NativeType>),
    /// Name to value map returned by commands with several outputs.
    NamedResults,
}

impl NativeType {
    /// `list[inner]`.
    pub fn list(inner: NativeType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Wrap in `Optional`, unless already optional.
    pub fn optional(self) -> Self {
        match self {
            Self::Optional(_) => self,
            other => Self::Optional(Box::new(other)),
        }
    }

    /// Whether this is an `Optional` wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The type with any `Optional` wrapper removed.
    pub fn unwrap_optional(&self) -> &NativeType {
        match self {
            Self::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    /// The displayable kind, if this type is one.
    pub fn display_kind(&self) -> Option<DisplayKind> {
        match self.unwrap_optional() {
            Self::Layer(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Whether the host can display values of this type natively.
    pub fn is_displayable(&self) -> bool {
        self.display_kind().is_some()
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Complex => f.write_str("complex"),
            Self::Str => f.write_str("str"),
            Self::Path => f.write_str("Path"),
            Self::DateTime => f.write_str("datetime"),
            Self::Enum => f.write_str("Enum"),
            Self::ColorMap => f.write_str("Colormap"),
            Self::Table => f.write_str("Table"),
            Self::List(inner) => write!(f, "list[{}]", inner),
            Self::Layer(kind) => write!(f, "{}", kind),
            Self::Standin(kind) => write!(f, "{}", kind),
            Self::ForeignObject => f.write_str("object"),
            Self::Optional(inner) => write!(f, "Optional[{}]", inner),
            Self::NamedResults => f.write_str("dict[str, object]"),
        }
    }
}

/// A dense n-dimensional array of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Create an array, returning `None` if `data` does not fill `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Option<Self> {
        (shape.iter().product::<usize>() == data.len()).then_some(Self { shape, data })
    }

    /// An array of zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    /// Dimensions, slowest-varying first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Samples in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable samples in row-major order.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A host-native mutable visual item, such as an image layer.
#[derive(Debug)]
pub struct Resource {
    name: String,
    kind: DisplayKind,
    data: RwLock<NdArray>,
    revision: AtomicU64,
}

/// Shared handle to a [`Resource`]. Equality is reference identity.
#[derive(Clone, Debug)]
pub struct ResourceRef(Arc<Resource>);

impl ResourceRef {
    /// Create a new resource.
    pub fn new(name: impl Into<String>, kind: DisplayKind, data: NdArray) -> Self {
        Self(Arc::new(Resource {
            name: name.into(),
            kind,
            data: RwLock::new(data),
            revision: AtomicU64::new(0),
        }))
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Display kind.
    pub fn kind(&self) -> DisplayKind {
        self.0.kind
    }

    /// Read access to the samples.
    pub fn read(&self) -> RwLockReadGuard<'_, NdArray> {
        self.0.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Modify the samples in place and bump the revision.
    pub fn update<T>(&self, f: impl FnOnce(&mut NdArray) -> T) -> T {
        let mut guard = self
            .0
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let out = f(&mut guard);
        self.0.revision.fetch_add(1, Ordering::SeqCst);
        out
    }

    /// Number of in-place updates applied so far.
    pub fn revision(&self) -> u64 {
        self.0.revision.load(Ordering::SeqCst)
    }

    /// Reference identity.
    pub fn same(&self, other: &ResourceRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ResourceRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

/// A host-side value.
#[derive(Clone, Debug)]
pub enum NativeValue {
    /// No value.
    None,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Filesystem path.
    Path(PathBuf),
    /// List of values.
    List(Vec<NativeValue>),
    /// Bulk array data without host display state.
    Array(Arc<NdArray>),
    /// A mutable host-native visual item.
    Resource(ResourceRef),
    /// A standin selection.
    Choice(StandinChoice),
    /// A foreign value with no host counterpart.
    Foreign(ForeignObject),
}

impl NativeValue {
    /// Whether this is `None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short name of the value's variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Path(_) => "path",
            Self::List(_) => "list",
            Self::Array(_) => "array",
            Self::Resource(r) => r.kind().name(),
            Self::Choice(_) => "choice",
            Self::Foreign(_) => "object",
        }
    }

    /// Reference identity for reference-typed values.
    ///
    /// Scalars never share a reference, so this is `false` for them even
    /// when they compare equal.
    pub fn same_reference(&self, other: &NativeValue) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Resource(a), Self::Resource(b)) => a.same(b),
            (Self::Foreign(a), Self::Foreign(b)) => a.same_object(b),
            _ => false,
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric payload, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Convert a JSON value, as used for declared defaults.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => Self::Str(value.to_string()),
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => a == b,
            (Self::Choice(a), Self::Choice(b)) => a == b,
            (Self::Foreign(a), Self::Foreign(b)) => a.same_object(b),
            _ => false,
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => f.write_str(s),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Array(a) => write!(f, "array{:?}", a.shape()),
            Self::Resource(r) => write!(f, "{} '{}'", r.kind(), r.name()),
            Self::Choice(c) => write!(f, "{}", c),
            Self::Foreign(o) => write!(f, "<{}>", o.foreign_type()),
        }
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<NdArray> for NativeValue {
    fn from(v: NdArray) -> Self {
        Self::Array(Arc::new(v))
    }
}

impl From<ResourceRef> for NativeValue {
    fn from(v: ResourceRef) -> Self {
        Self::Resource(v)
    }
}

impl From<StandinChoice> for NativeValue {
    fn from(v: StandinChoice) -> Self {
        Self::Choice(v)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}
