//! Errors raised by foreign runtime primitives.

use thiserror::Error;

/// A failure reported by the foreign runtime.
///
/// `trace` carries the foreign stack trace verbatim; it is surfaced to the
/// user unchanged inside [`BridgeError::CommandFault`](crate::BridgeError).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ForeignError {
    /// Short description of the failure.
    pub message: String,
    /// Foreign stack trace, empty when the runtime did not provide one.
    pub trace: String,
}

impl ForeignError {
    /// Create an error without a stack trace.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: String::new(),
        }
    }

    /// Create an error carrying a foreign stack trace.
    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// The most detailed human-readable report available.
    pub fn report(&self) -> &str {
        if self.trace.is_empty() {
            &self.message
        } else {
            &self.trace
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prefers_trace() {
        let bare = ForeignError::new("boom");
        assert_eq!(bare.report(), "boom");

        let traced = ForeignError::with_trace("boom", "java.lang.IllegalStateException: boom\n\tat Foo.run");
        assert!(traced.report().starts_with("java.lang.IllegalStateException"));
        assert_eq!(traced.to_string(), "boom");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ForeignError>();
    }
}
