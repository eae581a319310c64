//! Invocation signatures.
//!
//! A [`Signature`] is the first-class callable shape of a wrapped command:
//! ordered [`ParameterSpec`]s, mandatory ones first, followed by any
//! synthetic parameters contributed by [`SignatureExtension`]s, and a
//! [`ReturnSpec`]. The invocation layer consults it directly when binding
//! arguments.
//!
//! # Example
//!
//! ```
//! use cmdbridge::catalog::{CommandDescriptor, ParameterDescriptor};
//! use cmdbridge::conversion::{ConversionConfig, ConversionRegistry, TypeResolver};
//! use cmdbridge::foreign::memory::MemoryRuntime;
//! use cmdbridge::signature::SignatureBuilder;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let resolver = TypeResolver::new(
//!     Arc::new(ConversionRegistry::standard(&ConversionConfig::default())),
//!     Arc::new(MemoryRuntime::scientific()),
//! );
//! let builder = SignatureBuilder::new(Arc::new(resolver));
//!
//! let cmd = CommandDescriptor::new("threshold.apply", "Apply Threshold")
//!     .with_parameter(ParameterDescriptor::input("smooth", "java.lang.Boolean").with_default(json!(false)))
//!     .with_parameter(ParameterDescriptor::input("threshold", "java.lang.Number"))
//!     .with_parameter(ParameterDescriptor::output("mask", "net.imglib2.img.Img"));
//!
//! let inputs: Vec<_> = cmd.inputs().collect();
//! let signature = builder.build(&cmd, &inputs).unwrap();
//! assert_eq!(signature.to_string(), "(threshold: float, smooth: bool = false) -> Image");
//! ```

mod builder;
mod options;

pub use builder::{
    sink_optional, ExternalDisplayOption, ParameterSpec, ReturnSpec, ReturnedOutput, Signature,
    SignatureBuilder, SignatureExtension, EXTERNAL_DISPLAY_PARAMETER,
};
pub use options::{FileMode, ParameterOptions, WidgetKind};
