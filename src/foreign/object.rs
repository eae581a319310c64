//! Foreign type handles and opaque foreign values.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Handle naming a type of the foreign runtime.
///
/// Handles are compared by their fully qualified name. Whether one foreign
/// type can stand in for another is a question for the runtime's
/// [`TypeOracle`](crate::foreign::TypeOracle), never for the handle itself.
///
/// # Example
///
/// ```
/// use cmdbridge::foreign::ForeignType;
///
/// let ty = ForeignType::new("java.lang.Double");
/// assert_eq!(ty.name(), "java.lang.Double");
/// assert_eq!(ty.simple_name(), "Double");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForeignType(String);

impl ForeignType {
    /// Create a handle from a fully qualified type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The fully qualified name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit(['.', '$']).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ForeignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ForeignType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ForeignType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An opaque value living in the foreign runtime.
///
/// Cloning a `ForeignObject` clones the handle, not the value: two clones
/// report [`same_object`](Self::same_object) as `true`.
#[derive(Clone)]
pub struct ForeignObject {
    ty: ForeignType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl ForeignObject {
    /// Wrap a payload as a foreign object of type `ty`.
    pub fn new<T: Any + Send + Sync>(ty: ForeignType, payload: T) -> Self {
        Self {
            ty,
            payload: Arc::new(payload),
        }
    }

    /// Wrap an already shared payload.
    pub fn from_shared(ty: ForeignType, payload: Arc<dyn Any + Send + Sync>) -> Self {
        Self { ty, payload }
    }

    /// The runtime type this object was declared with.
    pub fn foreign_type(&self) -> &ForeignType {
        &self.ty
    }

    /// Borrow the payload as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.payload).downcast_ref::<T>()
    }

    /// Reference identity: both handles point at the same foreign value.
    pub fn same_object(&self, other: &ForeignObject) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }

    /// The same foreign value viewed through another declared type.
    pub fn retyped(&self, ty: ForeignType) -> Self {
        Self {
            ty,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl fmt::Debug for ForeignObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignObject")
            .field("type", &self.ty.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(ForeignType::new("net.imglib2.img.Img").simple_name(), "Img");
        assert_eq!(
            ForeignType::new("a.b.Outer$Inner").simple_name(),
            "Inner"
        );
        assert_eq!(ForeignType::new("boolean").simple_name(), "boolean");
    }

    #[test]
    fn test_serde_transparent() {
        let ty = ForeignType::new("java.lang.String");
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"java.lang.String\"");
        let parsed: ForeignType = serde_json::from_str("\"java.io.File\"").unwrap();
        assert_eq!(parsed.name(), "java.io.File");
    }

    #[test]
    fn test_identity_survives_clone_and_retype() {
        let obj = ForeignObject::new(ForeignType::new("java.lang.Integer"), 5_i64);
        let clone = obj.clone();
        let retyped = obj.retyped(ForeignType::new("java.lang.Number"));
        let other = ForeignObject::new(ForeignType::new("java.lang.Integer"), 5_i64);

        assert!(obj.same_object(&clone));
        assert!(obj.same_object(&retyped));
        assert!(!obj.same_object(&other));
        assert_eq!(retyped.foreign_type().name(), "java.lang.Number");
    }

    #[test]
    fn test_downcast() {
        let obj = ForeignObject::new(ForeignType::new("java.lang.String"), "x".to_string());
        assert_eq!(obj.downcast_ref::<String>().map(String::as_str), Some("x"));
        assert!(obj.downcast_ref::<i64>().is_none());
    }
}
