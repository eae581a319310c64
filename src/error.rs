//! Error types for wrapping and invoking foreign commands.

use crate::foreign::{ForeignError, ForeignType};
use crate::pipeline::SessionState;
use thiserror::Error;

/// Errors raised while wrapping a command or running an invocation.
///
/// Build-time errors ([`UnsupportedType`](Self::UnsupportedType)) abort the
/// wrapping of a single command. Every other variant terminates a single
/// invocation. Nothing is retried.
///
/// # Example
///
/// ```
/// use cmdbridge::BridgeError;
///
/// let error = BridgeError::missing_required_input("threshold");
/// assert!(error.to_string().contains("threshold"));
/// ```
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No native type could be resolved for a required parameter.
    #[error("no native type for parameter '{parameter}' of foreign type {foreign_type}")]
    UnsupportedType {
        /// Parameter name.
        parameter: String,
        /// Its declared foreign type.
        foreign_type: ForeignType,
    },

    /// A required input was given no value.
    #[error("no selection was made for required input '{parameter}'")]
    MissingRequiredInput {
        /// Parameter name.
        parameter: String,
    },

    /// A supplied value cannot be converted to the parameter's foreign type.
    #[error("input '{parameter}' expects {expected}, which a {found} value cannot be converted to")]
    TypeMismatch {
        /// Parameter name.
        parameter: String,
        /// Declared foreign type.
        expected: ForeignType,
        /// Kind of the supplied value.
        found: String,
    },

    /// A required input is still unresolved after all preprocessing ran.
    #[error("required input '{parameter}' of type {foreign_type} was never resolved")]
    UnresolvedRequiredInput {
        /// Parameter name.
        parameter: String,
        /// Declared foreign type.
        foreign_type: ForeignType,
    },

    /// The foreign command failed to initialize or run.
    #[error("command {command} failed: {message}\n{trace}")]
    CommandFault {
        /// Command identifier.
        command: String,
        /// Short failure message.
        message: String,
        /// Foreign stack trace, verbatim.
        trace: String,
    },

    /// A postprocessing stage failed.
    #[error("postprocessing stage {stage} failed for {command}: {message}\n{trace}")]
    PostprocessingFault {
        /// Command identifier.
        command: String,
        /// Stage name.
        stage: String,
        /// Short failure message.
        message: String,
        /// Foreign stack trace, verbatim.
        trace: String,
    },

    /// A named argument matches no parameter of the signature.
    #[error("{command} has no parameter named '{name}'")]
    UnknownArgument {
        /// Invocable name.
        command: String,
        /// The unknown argument name.
        name: String,
    },

    /// The runtime could not create a command instance.
    #[error("cannot instantiate {command}: {message}")]
    Instantiation {
        /// Command identifier.
        command: String,
        /// Description of the failure.
        message: String,
    },

    /// A session was driven out of order.
    #[error("session cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: SessionState,
        /// Requested state.
        to: SessionState,
    },
}

impl BridgeError {
    /// Create an UnsupportedType error.
    pub fn unsupported_type(parameter: impl Into<String>, foreign_type: ForeignType) -> Self {
        Self::UnsupportedType {
            parameter: parameter.into(),
            foreign_type,
        }
    }

    /// Create a MissingRequiredInput error.
    pub fn missing_required_input(parameter: impl Into<String>) -> Self {
        Self::MissingRequiredInput {
            parameter: parameter.into(),
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(
        parameter: impl Into<String>,
        expected: ForeignType,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            parameter: parameter.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create an UnresolvedRequiredInput error.
    pub fn unresolved_required_input(parameter: impl Into<String>, foreign_type: ForeignType) -> Self {
        Self::UnresolvedRequiredInput {
            parameter: parameter.into(),
            foreign_type,
        }
    }

    /// Wrap a foreign failure of `command`.
    pub fn command_fault(command: impl Into<String>, error: ForeignError) -> Self {
        Self::CommandFault {
            command: command.into(),
            message: error.message,
            trace: error.trace,
        }
    }

    /// Wrap a foreign failure of a postprocessing stage.
    pub fn postprocessing_fault(
        command: impl Into<String>,
        stage: impl Into<String>,
        error: ForeignError,
    ) -> Self {
        Self::PostprocessingFault {
            command: command.into(),
            stage: stage.into(),
            message: error.message,
            trace: error.trace,
        }
    }

    /// Create an UnknownArgument error.
    pub fn unknown_argument(command: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownArgument {
            command: command.into(),
            name: name.into(),
        }
    }

    /// Create an Instantiation error.
    pub fn instantiation(command: impl Into<String>, error: ForeignError) -> Self {
        Self::Instantiation {
            command: command.into(),
            message: error.message,
        }
    }

    /// Whether the error was raised while building a signature rather than
    /// while running an invocation.
    pub fn is_build_time(&self) -> bool {
        matches!(self, Self::UnsupportedType { .. } | Self::Instantiation { .. })
    }

    /// The foreign stack trace carried by the error, if any.
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::CommandFault { trace, .. } | Self::PostprocessingFault { trace, .. }
                if !trace.is_empty() =>
            {
                Some(trace.as_str())
            }
            _ => None,
        }
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
