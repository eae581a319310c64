//! Parameter direction as declared by the foreign command.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a value flows through a command parameter.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::Direction;
///
/// assert!(Direction::Both.is_input());
/// assert!(Direction::Both.is_output());
/// assert_eq!(Direction::OutputOnly.to_string(), "output");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	/// Supplied by the caller, read by the command.
	InputOnly,

	/// Produced by the command.
	OutputOnly,

	/// Supplied by the caller and written by the command in place.
	Both,
}

impl Direction {
	/// The caller supplies a value for this parameter.
	pub fn is_input(self) -> bool {
		matches!(self, Self::InputOnly | Self::Both)
	}

	/// The command produces a value for this parameter.
	pub fn is_output(self) -> bool {
		matches!(self, Self::OutputOnly | Self::Both)
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InputOnly => write!(f, "input"),
			Self::OutputOnly => write!(f, "output"),
			Self::Both => write!(f, "both"),
		}
	}
}

impl Default for Direction {
	fn default() -> Self {
		Self::InputOnly
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(Direction::InputOnly.to_string(), "input");
		assert_eq!(Direction::OutputOnly.to_string(), "output");
		assert_eq!(Direction::Both.to_string(), "both");
	}

	#[test]
	fn test_flow_predicates() {
		assert!(Direction::InputOnly.is_input());
		assert!(!Direction::InputOnly.is_output());
		assert!(!Direction::OutputOnly.is_input());
		assert!(Direction::OutputOnly.is_output());
		assert!(Direction::Both.is_input() && Direction::Both.is_output());
	}

	#[test]
	fn test_serde_snake_case() {
		assert_eq!(serde_json::to_string(&Direction::InputOnly).unwrap(), "\"input_only\"");
		assert_eq!(serde_json::to_string(&Direction::Both).unwrap(), "\"both\"");
		let parsed: Direction = serde_json::from_str("\"output_only\"").unwrap();
		assert_eq!(parsed, Direction::OutputOnly);
	}

	#[test]
	fn test_default() {
		assert_eq!(Direction::default(), Direction::InputOnly);
	}
}
