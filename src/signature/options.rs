//! Per-parameter widget options derived from presentation hints.

use crate::catalog::{Direction, ParameterDescriptor};
use crate::types::{DisplayKind, NativeType};
use serde::{Deserialize, Serialize};

/// How a path input is picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    /// An existing file.
    Open,
    /// A file that may not exist yet.
    Save,
    /// A directory.
    Directory,
}

impl FileMode {
    /// The mode requested by a command's widget style, if it names one.
    pub fn from_style(style: &str) -> Option<Self> {
        match style {
            "open" => Some(Self::Open),
            "save" => Some(Self::Save),
            "directory" => Some(Self::Directory),
            _ => None,
        }
    }
}

/// The input widget a host should prefer for a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "widget")]
pub enum WidgetKind {
    /// An image the command modifies in place; the host picks an existing
    /// layer or allocates a new one.
    MutableOutput,
    /// Drop-down list of choices.
    Select,
    /// Radio buttons over the choices.
    RadioButtons,
    /// Integer slider.
    Slider,
    /// Floating point slider.
    FloatSlider,
    /// Integer spin box.
    SpinBox,
    /// Floating point spin box.
    FloatSpinBox,
    /// File or directory picker.
    FileEdit {
        /// What is being picked.
        mode: FileMode,
    },
}

impl WidgetKind {
    /// The widget for `param` presented as `native`, if one is preferred.
    pub fn preferred(param: &ParameterDescriptor, native: &NativeType) -> Option<Self> {
        let native = native.unwrap_optional();
        let style = param.ui_hints.style.as_deref();

        if param.direction == Direction::Both && *native == NativeType::Layer(DisplayKind::Image) {
            return Some(Self::MutableOutput);
        }
        if *native == NativeType::Path {
            let mode = style.and_then(FileMode::from_style).unwrap_or(FileMode::Open);
            return Some(Self::FileEdit { mode });
        }

        match (style?, native) {
            ("listBox", NativeType::Str) => Some(Self::Select),
            ("radioButtonHorizontal" | "radioButtonVertical", NativeType::Str) => {
                Some(Self::RadioButtons)
            }
            ("slider", NativeType::Int) => Some(Self::Slider),
            ("slider", NativeType::Float) => Some(Self::FloatSlider),
            ("spinner", NativeType::Int) => Some(Self::SpinBox),
            ("spinner", NativeType::Float) => Some(Self::FloatSpinBox),
            _ => None,
        }
    }
}

/// Widget configuration for one interactive parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOptions {
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Increment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Label shown next to the widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Hover text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Accepted values. Never empty when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,

    /// Preferred widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetKind>,
}

impl ParameterOptions {
    /// Options for `param` presented as `native`, or `None` when there is
    /// nothing to configure.
    pub fn for_parameter(param: &ParameterDescriptor, native: &NativeType) -> Option<Self> {
        let hints = &param.ui_hints;
        let options = Self {
            min: hints.min,
            max: hints.max,
            step: hints.step,
            label: hints.label.clone(),
            tooltip: hints.tooltip.clone(),
            choices: (!hints.choices.is_empty()).then(|| hints.choices.clone()),
            widget: WidgetKind::preferred(param, native),
        };
        (!options.is_empty()).then_some(options)
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
