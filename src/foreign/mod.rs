//! The foreign runtime seam.
//!
//! Everything the bridge needs from the foreign command runtime goes
//! through the traits defined here: type queries ([`TypeOracle`]), value
//! conversion and command instantiation ([`ForeignRuntime`]), the per-call
//! [`CommandInstance`] and the runtime's pre/postprocessing
//! [`ModuleStage`]s. [`memory::MemoryRuntime`] is an in-process
//! implementation.

mod error;
pub mod memory;
mod object;
mod traits;

pub use error::ForeignError;
pub use object::{ForeignObject, ForeignType};
pub use traits::{CommandInstance, ForeignRuntime, ModuleStage, TypeOracle};
