//! Command and parameter metadata produced by discovery.

use crate::catalog::Direction;
use crate::foreign::ForeignType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presentation hints attached to a parameter by its command author.
///
/// Every field is optional; hosts use whatever is present to pick and
/// configure an input widget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiHints {
	/// Lower bound for numeric inputs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<f64>,

	/// Upper bound for numeric inputs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<f64>,

	/// Increment for numeric inputs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<f64>,

	/// Human-readable label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,

	/// Longer description shown on hover.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tooltip: Option<String>,

	/// Fixed set of accepted string values.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub choices: Vec<String>,

	/// Widget style requested by the command, e.g. `slider` or `listBox`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
}

impl UiHints {
	/// True when no hint is set.
	pub fn is_empty(&self) -> bool {
		self == &Self::default()
	}
}

/// One typed, named parameter of a foreign command.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::{Direction, ParameterDescriptor};
/// use serde_json::json;
///
/// let smooth = ParameterDescriptor::input("smooth", "java.lang.Boolean")
///     .with_default(json!(false));
///
/// assert_eq!(smooth.direction, Direction::InputOnly);
/// assert!(smooth.required);
/// assert!(smooth.has_default());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
	/// Parameter name, unique within its command.
	pub name: String,

	/// Declared type in the foreign runtime.
	pub foreign_type: ForeignType,

	/// Flow direction.
	#[serde(default)]
	pub direction: Direction,

	/// Whether the command demands a value.
	#[serde(default = "default_required")]
	pub required: bool,

	/// Default value as a JSON scalar, resolved into a native value when a
	/// signature is built.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<Value>,

	/// Presentation hints.
	#[serde(default, skip_serializing_if = "UiHints::is_empty")]
	pub ui_hints: UiHints,
}

fn default_required() -> bool {
	true
}

impl ParameterDescriptor {
	/// Create a required parameter.
	pub fn new(
		name: impl Into<String>,
		foreign_type: impl Into<ForeignType>,
		direction: Direction,
	) -> Self {
		Self {
			name: name.into(),
			foreign_type: foreign_type.into(),
			direction,
			required: true,
			default_value: None,
			ui_hints: UiHints::default(),
		}
	}

	/// Create a required input parameter.
	pub fn input(name: impl Into<String>, foreign_type: impl Into<ForeignType>) -> Self {
		Self::new(name, foreign_type, Direction::InputOnly)
	}

	/// Create a required output parameter.
	pub fn output(name: impl Into<String>, foreign_type: impl Into<ForeignType>) -> Self {
		Self::new(name, foreign_type, Direction::OutputOnly)
	}

	/// Create a required parameter that is read and written in place.
	pub fn both(name: impl Into<String>, foreign_type: impl Into<ForeignType>) -> Self {
		Self::new(name, foreign_type, Direction::Both)
	}

	/// Mark the parameter as not required.
	pub fn optional(mut self) -> Self {
		self.required = false;
		self
	}

	/// Attach a default value.
	pub fn with_default(mut self, value: Value) -> Self {
		self.default_value = Some(value);
		self
	}

	/// Attach presentation hints.
	pub fn with_hints(mut self, hints: UiHints) -> Self {
		self.ui_hints = hints;
		self
	}

	/// Whether a default value is declared.
	pub fn has_default(&self) -> bool {
		self.default_value.is_some()
	}

	/// Optional for argument ordering: not required, or defaulted.
	pub fn is_optional_argument(&self) -> bool {
		!self.required || self.has_default()
	}
}

/// Metadata for one invocable foreign command.
///
/// Descriptors are created at discovery time and never change afterwards;
/// the pipeline shares them behind an `Arc`.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::{CommandDescriptor, ParameterDescriptor};
///
/// let cmd = CommandDescriptor::new("filter.gauss", "Gaussian Blur")
///     .with_parameter(ParameterDescriptor::input("sigma", "java.lang.Double"))
///     .with_parameter(ParameterDescriptor::output("out", "net.imglib2.img.Img"));
///
/// assert_eq!(cmd.inputs().count(), 1);
/// assert_eq!(cmd.outputs().count(), 1);
/// assert!(cmd.parameter("sigma").is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
	/// Identifier the foreign runtime instantiates the command by.
	pub identifier: String,

	/// Human-readable title.
	pub title: String,

	/// Parameters in declaration order.
	#[serde(default)]
	pub parameters: Vec<ParameterDescriptor>,
}

impl CommandDescriptor {
	/// Create a descriptor with no parameters.
	pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			title: title.into(),
			parameters: Vec::new(),
		}
	}

	/// Append a parameter using builder pattern.
	pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
		self.parameters.push(parameter);
		self
	}

	/// Look up a parameter by name.
	pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
		self.parameters.iter().find(|p| p.name == name)
	}

	/// Parameters the caller may supply, in declaration order.
	pub fn inputs(&self) -> impl Iterator<Item = &ParameterDescriptor> {
		self.parameters.iter().filter(|p| p.direction.is_input())
	}

	/// Parameters the command produces, in declaration order.
	pub fn outputs(&self) -> impl Iterator<Item = &ParameterDescriptor> {
		self.parameters.iter().filter(|p| p.direction.is_output())
	}

	/// A name usable as a host-side identifier: the title in snake case,
	/// falling back to the identifier.
	pub fn invocable_name(&self) -> String {
		let source = if self.title.trim().is_empty() {
			&self.identifier
		} else {
			&self.title
		};
		let mut name = String::with_capacity(source.len());
		for c in source.chars() {
			if c.is_alphanumeric() {
				name.extend(c.to_lowercase());
			} else if !name.ends_with('_') && !name.is_empty() {
				name.push('_');
			}
		}
		while name.ends_with('_') {
			name.pop();
		}
		name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn threshold_command() -> CommandDescriptor {
		CommandDescriptor::new("threshold.apply", "Apply Threshold")
			.with_parameter(ParameterDescriptor::input("threshold", "java.lang.Number"))
			.with_parameter(
				ParameterDescriptor::input("smooth", "java.lang.Boolean").with_default(json!(false)),
			)
			.with_parameter(ParameterDescriptor::output("result", "net.imglib2.img.Img"))
	}

	#[test]
	fn test_builders() {
		let p = ParameterDescriptor::both("image", "net.imagej.Dataset").optional();
		assert_eq!(p.direction, Direction::Both);
		assert!(!p.required);
		assert!(p.is_optional_argument());
		assert!(!p.has_default());
	}

	#[test]
	fn test_optional_argument_semantics() {
		let req = ParameterDescriptor::input("a", "java.lang.Integer");
		let defaulted = req.clone().with_default(json!(3));
		let opt = req.clone().optional();

		assert!(!req.is_optional_argument());
		assert!(defaulted.is_optional_argument());
		assert!(defaulted.required);
		assert!(opt.is_optional_argument());
	}

	#[test]
	fn test_inputs_and_outputs() {
		let cmd = threshold_command().with_parameter(ParameterDescriptor::both(
			"mask",
			"net.imagej.Dataset",
		));
		let inputs: Vec<_> = cmd.inputs().map(|p| p.name.as_str()).collect();
		let outputs: Vec<_> = cmd.outputs().map(|p| p.name.as_str()).collect();

		assert_eq!(inputs, vec!["threshold", "smooth", "mask"]);
		assert_eq!(outputs, vec!["result", "mask"]);
	}

	#[test]
	fn test_invocable_name() {
		assert_eq!(threshold_command().invocable_name(), "apply_threshold");
		assert_eq!(
			CommandDescriptor::new("filter.gauss", "  ").invocable_name(),
			"filter_gauss"
		);
		assert_eq!(
			CommandDescriptor::new("x", "Gauss (3D)...").invocable_name(),
			"gauss_3d"
		);
	}

	#[test]
	fn test_serde_defaults() {
		let cmd: CommandDescriptor = serde_json::from_value(json!({
			"identifier": "math.add",
			"title": "Add",
			"parameters": [
				{ "name": "a", "foreign_type": "java.lang.Integer" },
				{ "name": "b", "foreign_type": "java.lang.Integer", "required": false,
				  "ui_hints": { "min": 0.0, "style": "slider" } },
				{ "name": "sum", "foreign_type": "java.lang.Integer", "direction": "output_only" }
			]
		}))
		.unwrap();

		assert_eq!(cmd.parameters.len(), 3);
		assert!(cmd.parameters[0].required);
		assert_eq!(cmd.parameters[0].direction, Direction::InputOnly);
		assert!(!cmd.parameters[1].required);
		assert_eq!(cmd.parameters[1].ui_hints.style.as_deref(), Some("slider"));
		assert_eq!(cmd.parameters[2].direction, Direction::OutputOnly);
	}

	#[test]
	fn test_serialization_skips_empty_hints() {
		let value = serde_json::to_value(ParameterDescriptor::input("a", "int")).unwrap();
		assert!(value.get("ui_hints").is_none());
		assert!(value.get("default_value").is_none());
	}
}
