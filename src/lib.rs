//! Command Bridge (cmdbridge) - Execution engine for foreign command runtimes
//!
//! cmdbridge wraps commands that live in a foreign runtime as native
//! callables. For every command it derives a typed signature from the
//! command's declared parameters, drives the command through its
//! pre/postprocessing pipeline and sorts the outputs into results the host
//! can display natively and results it shows as plain values.
//!
//! - **`engine`** - Catalog, type conversion, signatures and the session pipeline
//! - **`runtime`** - Runtime readiness gate, background search and invocation worker
//! - **`config`** - Configuration and environment loading
//! - **`observability`** - Markdown journal of invocations
//!
//! # Features
//!
//! Enable the features you need in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cmdbridge = { version = "0.3", default-features = false, features = ["engine"] }
//! # Or enable everything:
//! cmdbridge = { version = "0.3", features = ["all"] }
//! ```
//!
//! # Example: Wrapping a command
//!
//! ```
//! use cmdbridge::catalog::{CommandDescriptor, ParameterDescriptor};
//! use cmdbridge::foreign::memory::MemoryRuntime;
//! use cmdbridge::types::{NativeValue, NdArray};
//! use cmdbridge::Bridge;
//! use std::sync::Arc;
//!
//! let runtime = MemoryRuntime::scientific().with_command("img.blank", |ctx| {
//!     let size = ctx.f64("size").unwrap_or(1.0) as usize;
//!     ctx.set_value("image", NativeValue::from(NdArray::zeros(vec![size, size])))
//! });
//! let bridge = Bridge::new(Arc::new(runtime));
//!
//! let blank = CommandDescriptor::new("img.blank", "Blank Image")
//!     .with_parameter(ParameterDescriptor::input("size", "java.lang.Integer"))
//!     .with_parameter(ParameterDescriptor::output("image", "net.imagej.Dataset"));
//!
//! let invocable = bridge.wrap(Arc::new(blank)).unwrap();
//! assert_eq!(invocable.name(), "blank_image");
//!
//! let outcome = invocable.invoke(vec![Some(NativeValue::Int(4))]).unwrap();
//! assert_eq!(outcome.displayable[0].name, "image");
//! ```
//!
//! # Example: Using the config feature
//!
//! ```ignore
//! use cmdbridge::config::{ConfigurationLoader, EnvironmentLoader};
//! use cmdbridge::foreign::memory::MemoryRuntime;
//! use cmdbridge::Bridge;
//! use std::sync::Arc;
//!
//! let mut loader = ConfigurationLoader::new(None).unwrap();
//! EnvironmentLoader::new(None).apply(&mut loader.config);
//!
//! let bridge = loader
//!     .config
//!     .configure(Bridge::builder(Arc::new(MemoryRuntime::scientific())))
//!     .build();
//! ```

#![warn(missing_docs)]

/// Discovered commands and their metadata (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod catalog;

/// Host/foreign type conversion table and resolver (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod conversion;

/// The foreign runtime seam (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod foreign;

/// Host value model (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod types;

/// Signature generation (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod signature;

/// Per-invocation session pipeline (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod pipeline;

/// Error types (enabled with the `engine` feature)
#[cfg(feature = "engine")]
pub mod error;

#[cfg(feature = "engine")]
mod bridge;

/// Async runtime plumbing (enabled with the `runtime` feature)
#[cfg(feature = "runtime")]
pub mod runtime;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

#[cfg(feature = "engine")]
pub use bridge::{Bridge, BridgeBuilder};
#[cfg(feature = "engine")]
pub use error::{BridgeError, BridgeResult};

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "engine")]
    pub use crate::catalog::{
        CommandCatalog, CommandDescriptor, DefaultCommandCatalog, Direction, ParameterDescriptor,
    };

    #[cfg(feature = "engine")]
    pub use crate::foreign::{ForeignRuntime, ForeignType};

    #[cfg(feature = "engine")]
    pub use crate::pipeline::{GeneratedInvocable, InvocationOutcome, PipelineConfig};

    #[cfg(feature = "engine")]
    pub use crate::types::{NativeType, NativeValue};

    #[cfg(feature = "engine")]
    pub use crate::{Bridge, BridgeBuilder, BridgeError, BridgeResult};

    #[cfg(feature = "runtime")]
    pub use crate::runtime::{DisplaySink, InvocationWorker, RuntimeGate, SearchCoordinator};

    #[cfg(feature = "config")]
    pub use crate::config::{BridgeConfig, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "observability")]
    pub use crate::observability::InvocationLog;
}
