//! Observability utilities for the bridge.
//!
//! Pipeline events are emitted through `tracing`; installing a subscriber is
//! left to the host. This module adds a markdown journal of invocations.
//!
//! # Example
//!
//! ```no_run
//! use cmdbridge::foreign::memory::MemoryRuntime;
//! use cmdbridge::observability::InvocationLog;
//! use cmdbridge::Bridge;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! // Create a journal in the temp directory
//! let log = Arc::new(InvocationLog::new(None, Some("DEBUG")).unwrap());
//! log.log_session_start("memory", &HashMap::new()).unwrap();
//!
//! // Every invocation through this bridge is journaled
//! let bridge = Bridge::builder(Arc::new(MemoryRuntime::scientific()))
//!     .observer(log.clone())
//!     .build();
//!
//! log.log_completion("Host closed").unwrap();
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::InvocationLog;
