//! Host-side type and value model.
//!
//! [`NativeType`] is what a foreign type is presented as in a generated
//! signature; [`NativeValue`] is what a caller passes and gets back.
//! Reference-typed values ([`NdArray`] buffers, [`ResourceRef`] layers and
//! foreign objects) compare by identity where it matters for in-place
//! mutation tracking.

mod native;
mod standin;

pub use native::{DisplayKind, NativeType, NativeValue, NdArray, Resource, ResourceRef};
pub use standin::{StandinChoice, StandinKind};
