//! Partitioning of command outputs.

use crate::types::{DisplayKind, NativeValue};
use std::fmt;

/// An output the host can show natively.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayableResult {
    /// Output name, used as the display label.
    pub name: String,
    /// How to show it.
    pub kind: DisplayKind,
    /// The value.
    pub value: NativeValue,
}

/// An output shown generically, as a name and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedValue {
    /// Output name.
    pub name: String,
    /// The value.
    pub value: NativeValue,
}

impl fmt::Display for NamedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Both partitions, each in output declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassifiedOutputs {
    /// Natively displayable results.
    pub displayable: Vec<DisplayableResult>,
    /// Everything else.
    pub non_displayable: Vec<NamedValue>,
}

impl ClassifiedOutputs {
    /// True when nothing is left to show.
    pub fn is_empty(&self) -> bool {
        self.displayable.is_empty() && self.non_displayable.is_empty()
    }
}

/// Sorts a command's outputs into displayable and generic results.
///
/// # Example
///
/// ```
/// use cmdbridge::pipeline::OutputClassifier;
/// use cmdbridge::types::{NativeValue, NdArray};
///
/// let outputs = vec![
///     ("mask".to_string(), NativeValue::from(NdArray::zeros(vec![2, 2]))),
///     ("area".to_string(), NativeValue::Float(4.0)),
///     ("unused".to_string(), NativeValue::None),
/// ];
/// let classified = OutputClassifier.classify(&outputs, &[]);
///
/// assert_eq!(classified.displayable.len(), 1);
/// assert_eq!(classified.non_displayable[0].name, "area");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputClassifier;

impl OutputClassifier {
    /// Classify `outputs`, skipping any that hand back the very value the
    /// caller supplied under the same name.
    pub fn classify(
        &self,
        outputs: &[(String, NativeValue)],
        supplied: &[(String, NativeValue)],
    ) -> ClassifiedOutputs {
        let mut classified = ClassifiedOutputs::default();

        for (name, value) in outputs {
            let mutated_in_place = supplied
                .iter()
                .any(|(n, v)| n == name && v.same_reference(value));
            if mutated_in_place {
                tracing::debug!(output = %name, "skipping output mutated in place");
                continue;
            }

            match value {
                NativeValue::Array(_) => classified.displayable.push(DisplayableResult {
                    name: name.clone(),
                    kind: DisplayKind::Image,
                    value: value.clone(),
                }),
                NativeValue::Resource(resource) => classified.displayable.push(DisplayableResult {
                    name: name.clone(),
                    kind: resource.kind(),
                    value: value.clone(),
                }),
                NativeValue::None => {
                    tracing::debug!(output = %name, "dropping empty output");
                }
                other => classified.non_displayable.push(NamedValue {
                    name: name.clone(),
                    value: other.clone(),
                }),
            }
        }

        tracing::debug!(
            displayable = classified.displayable.len(),
            non_displayable = classified.non_displayable.len(),
            "classified outputs"
        );
        classified
    }
}
