//! Signature synthesis.

use crate::catalog::{CommandDescriptor, ParameterDescriptor};
use crate::conversion::TypeResolver;
use crate::error::BridgeResult;
use crate::signature::ParameterOptions;
use crate::types::{NativeType, NativeValue};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Name of the synthetic flag added by [`ExternalDisplayOption`].
pub const EXTERNAL_DISPLAY_PARAMETER: &str = "display_results_in_new_window";

/// One parameter of a generated signature.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Type the caller supplies.
    pub native_type: NativeType,
    /// Value used when the caller supplies nothing. `None` means the
    /// argument is mandatory.
    pub default: Option<NativeValue>,
    /// Added by a [`SignatureExtension`] rather than taken from the command.
    pub synthetic: bool,
    /// Widget configuration, when the command asked for any.
    pub options: Option<ParameterOptions>,
}

impl ParameterSpec {
    /// A trailing host parameter. Always optional.
    pub fn synthetic(name: impl Into<String>, native_type: NativeType, default: NativeValue) -> Self {
        Self {
            name: name.into(),
            native_type,
            default: Some(default),
            synthetic: true,
            options: None,
        }
    }

    /// Whether the argument may be omitted.
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.native_type)?;
        match &self.default {
            Some(NativeValue::Str(s)) => write!(f, " = {:?}", s),
            Some(value) => write!(f, " = {}", value),
            None => Ok(()),
        }
    }
}

/// What a generated invocable returns.
#[derive(Clone, Debug, PartialEq)]
pub enum ReturnSpec {
    /// Nothing is returned.
    None,
    /// Exactly one output, of this type.
    Single(NativeType),
    /// Several outputs, returned by name.
    NamedResults,
}

impl ReturnSpec {
    /// The returned type, if anything is returned.
    pub fn native_type(&self) -> Option<NativeType> {
        match self {
            Self::None => None,
            Self::Single(ty) => Some(ty.clone()),
            Self::NamedResults => Some(NativeType::NamedResults),
        }
    }
}

impl fmt::Display for ReturnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.native_type() {
            Some(ty) => write!(f, "{}", ty),
            None => f.write_str("None"),
        }
    }
}

/// The callable shape of a wrapped command.
///
/// # Example
///
/// ```
/// use cmdbridge::signature::{ParameterSpec, ReturnSpec, Signature};
/// use cmdbridge::types::{DisplayKind, NativeType, NativeValue};
///
/// let signature = Signature::new(
///     "gaussian_blur",
///     vec![
///         ParameterSpec {
///             name: "sigma".to_string(),
///             native_type: NativeType::Float,
///             default: None,
///             synthetic: false,
///             options: None,
///         },
///         ParameterSpec::synthetic("preview", NativeType::Bool, NativeValue::Bool(false)),
///     ],
///     ReturnSpec::Single(NativeType::Layer(DisplayKind::Image)),
/// );
///
/// assert_eq!(signature.to_string(), "(sigma: float, preview: bool = false) -> Image");
/// assert_eq!(signature.position("preview"), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    name: String,
    parameters: Vec<ParameterSpec>,
    returns: ReturnSpec,
}

impl Signature {
    /// Create a signature.
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterSpec>, returns: ReturnSpec) -> Self {
        Self {
            name: name.into(),
            parameters,
            returns,
        }
    }

    /// Invocable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in call order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Return type.
    pub fn returns(&self) -> &ReturnSpec {
        &self.returns
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Call position of a parameter.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    /// Parameters taken from the command, in call order.
    pub fn command_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| !p.synthetic)
    }

    /// Parameters added by extensions.
    pub fn synthetic_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.synthetic)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// Order parameters so every mandatory argument precedes every optional one.
///
/// The partition is stable: both halves keep their original order.
pub fn sink_optional<'a, I>(params: I) -> Vec<&'a ParameterDescriptor>
where
    I: IntoIterator<Item = &'a ParameterDescriptor>,
{
    let (mandatory, optional): (Vec<_>, Vec<_>) =
        params.into_iter().partition(|p| !p.is_optional_argument());
    mandatory.into_iter().chain(optional).collect()
}

/// A resolved output that the invocable returns to its caller.
#[derive(Clone, Debug)]
pub struct ReturnedOutput<'a> {
    /// The output parameter.
    pub parameter: &'a ParameterDescriptor,
    /// Its native type.
    pub native_type: NativeType,
}

/// Contributes trailing parameters to generated signatures.
pub trait SignatureExtension: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Parameters to append for `descriptor`, whose returned outputs are
    /// `outputs`.
    fn parameters(
        &self,
        descriptor: &CommandDescriptor,
        outputs: &[ReturnedOutput<'_>],
    ) -> Vec<ParameterSpec>;
}

/// Adds a "show results in a separate window" flag when some returned
/// output cannot be displayed natively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExternalDisplayOption {
    default: bool,
}

impl ExternalDisplayOption {
    /// Use `default` as the flag's default value.
    pub fn new(default: bool) -> Self {
        Self { default }
    }
}

impl SignatureExtension for ExternalDisplayOption {
    fn name(&self) -> &str {
        "external_display"
    }

    fn parameters(
        &self,
        _descriptor: &CommandDescriptor,
        outputs: &[ReturnedOutput<'_>],
    ) -> Vec<ParameterSpec> {
        if outputs.iter().all(|o| o.native_type.is_displayable()) {
            return Vec::new();
        }
        vec![ParameterSpec::synthetic(
            EXTERNAL_DISPLAY_PARAMETER,
            NativeType::Bool,
            NativeValue::Bool(self.default),
        )]
    }
}

/// Builds [`Signature`]s from descriptors.
#[derive(Clone)]
pub struct SignatureBuilder {
    resolver: Arc<TypeResolver>,
    extensions: Vec<Arc<dyn SignatureExtension>>,
}

impl SignatureBuilder {
    /// A builder with no extensions.
    pub fn new(resolver: Arc<TypeResolver>) -> Self {
        Self {
            resolver,
            extensions: Vec::new(),
        }
    }

    /// Append an extension. Extensions contribute parameters in the order
    /// they were added.
    pub fn with_extension(mut self, extension: Arc<dyn SignatureExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// The resolver used for parameter types.
    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// The signature parameter for one command parameter.
    ///
    /// Fails with `UnsupportedType` when the parameter's type cannot be
    /// resolved.
    pub fn build_parameter(&self, param: &ParameterDescriptor) -> BridgeResult<ParameterSpec> {
        let resolved = self.resolver.resolve(param)?;
        let default = match &param.default_value {
            Some(value) => Some(coerce_default(NativeValue::from_json(value), &resolved)),
            None if !param.required => Some(NativeValue::None),
            None => None,
        };
        let native_type = if param.required {
            resolved
        } else {
            resolved.optional()
        };
        let options = ParameterOptions::for_parameter(param, &native_type);
        Ok(ParameterSpec {
            name: param.name.clone(),
            native_type,
            default,
            synthetic: false,
            options,
        })
    }

    /// The signature of `descriptor` when the caller supplies `interactive`.
    ///
    /// Outputs not among `interactive` are returned to the caller.
    pub fn build(
        &self,
        descriptor: &CommandDescriptor,
        interactive: &[&ParameterDescriptor],
    ) -> BridgeResult<Signature> {
        let mut parameters = sink_optional(interactive.iter().copied())
            .into_iter()
            .map(|p| self.build_parameter(p))
            .collect::<BridgeResult<Vec<_>>>()?;

        let supplied: HashSet<&str> = interactive.iter().map(|p| p.name.as_str()).collect();
        let outputs = self.returned_outputs(descriptor, &supplied);

        for extension in &self.extensions {
            let extra = extension.parameters(descriptor, &outputs);
            if !extra.is_empty() {
                tracing::debug!(
                    command = %descriptor.identifier,
                    extension = extension.name(),
                    count = extra.len(),
                    "added synthetic parameters"
                );
            }
            parameters.extend(extra);
        }

        let returns = match outputs.as_slice() {
            [] => ReturnSpec::None,
            [single] => ReturnSpec::Single(single.native_type.clone()),
            _ => ReturnSpec::NamedResults,
        };

        Ok(Signature::new(descriptor.invocable_name(), parameters, returns))
    }

    fn returned_outputs<'a>(
        &self,
        descriptor: &'a CommandDescriptor,
        supplied: &HashSet<&str>,
    ) -> Vec<ReturnedOutput<'a>> {
        descriptor
            .outputs()
            .filter(|p| !supplied.contains(p.name.as_str()))
            .map(|p| ReturnedOutput {
                parameter: p,
                native_type: self
                    .resolver
                    .try_resolve(p)
                    .unwrap_or(NativeType::ForeignObject),
            })
            .collect()
    }
}

impl fmt::Debug for SignatureBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extensions: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("SignatureBuilder")
            .field("resolver", &self.resolver)
            .field("extensions", &extensions)
            .finish()
    }
}

fn coerce_default(value: NativeValue, native: &NativeType) -> NativeValue {
    match (value, native) {
        (NativeValue::Str(label), NativeType::Standin(kind)) => match kind.choice_for_label(&label) {
            Some(choice) => NativeValue::Choice(choice),
            None => NativeValue::Str(label),
        },
        (NativeValue::Int(i), NativeType::Float) => NativeValue::Float(i as f64),
        (NativeValue::Str(s), NativeType::Path) => NativeValue::Path(s.into()),
        (value, _) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{ConversionConfig, ConversionRegistry};
    use crate::error::BridgeError;
    use crate::foreign::memory::MemoryRuntime;
    use crate::types::{DisplayKind, StandinChoice, StandinKind};
    use serde_json::json;

    fn builder() -> SignatureBuilder {
        let resolver = TypeResolver::new(
            Arc::new(ConversionRegistry::standard(&ConversionConfig::default())),
            Arc::new(MemoryRuntime::scientific()),
        );
        SignatureBuilder::new(Arc::new(resolver))
    }

    fn names(params: &[&ParameterDescriptor]) -> Vec<String> {
        params.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_sink_optional_is_stable() {
        let params = vec![
            ParameterDescriptor::input("req1", "int"),
            ParameterDescriptor::input("optA", "int").optional(),
            ParameterDescriptor::input("req2", "int"),
            ParameterDescriptor::input("optB", "int").with_default(json!(3)),
        ];
        assert_eq!(
            names(&sink_optional(&params)),
            vec!["req1", "req2", "optA", "optB"]
        );
    }

    #[test]
    fn test_sink_optional_keeps_sorted_input() {
        let params = vec![
            ParameterDescriptor::input("a", "int"),
            ParameterDescriptor::input("b", "int").optional(),
        ];
        assert_eq!(names(&sink_optional(&params)), vec!["a", "b"]);
        assert!(sink_optional(&Vec::new()).is_empty());
    }

    #[test]
    fn test_build_parameter_required() {
        let spec = builder()
            .build_parameter(&ParameterDescriptor::input("threshold", "java.lang.Number"))
            .unwrap();
        assert_eq!(spec.native_type, NativeType::Float);
        assert_eq!(spec.default, None);
        assert!(!spec.is_optional());
        assert_eq!(spec.to_string(), "threshold: float");
    }

    #[test]
    fn test_build_parameter_not_required_is_optional() {
        let spec = builder()
            .build_parameter(&ParameterDescriptor::input("count", "java.lang.Integer").optional())
            .unwrap();
        assert_eq!(spec.native_type, NativeType::Int.optional());
        assert_eq!(spec.default, Some(NativeValue::None));
        assert_eq!(spec.to_string(), "count: Optional[int] = None");
    }

    #[test]
    fn test_build_parameter_defaults() {
        let b = builder();
        let smooth = b
            .build_parameter(
                &ParameterDescriptor::input("smooth", "java.lang.Boolean").with_default(json!(false)),
            )
            .unwrap();
        assert_eq!(smooth.native_type, NativeType::Bool);
        assert_eq!(smooth.default, Some(NativeValue::Bool(false)));

        let sigma = b
            .build_parameter(&ParameterDescriptor::input("sigma", "double").with_default(json!(2)))
            .unwrap();
        assert_eq!(sigma.default, Some(NativeValue::Float(2.0)));

        let method = b
            .build_parameter(
                &ParameterDescriptor::input("method", "java.lang.String").with_default(json!("Otsu")),
            )
            .unwrap();
        assert_eq!(method.to_string(), "method: str = \"Otsu\"");
    }

    #[test]
    fn test_standin_default_maps_to_choice() {
        let spec = builder()
            .build_parameter(
                &ParameterDescriptor::input("oob", StandinKind::OutOfBoundsFactory.foreign_type())
                    .with_default(json!("Periodic")),
            )
            .unwrap();
        assert_eq!(spec.native_type, NativeType::Standin(StandinKind::OutOfBoundsFactory));
        assert_eq!(spec.default, Some(NativeValue::Choice(StandinChoice::Periodic)));
    }

    #[test]
    fn test_build_parameter_unsupported() {
        let err = builder()
            .build_parameter(&ParameterDescriptor::input("thing", "org.example.Unknown"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedType { .. }));
    }

    #[test]
    fn test_return_arity() {
        let b = builder();

        let none = CommandDescriptor::new("a", "A")
            .with_parameter(ParameterDescriptor::input("x", "int"));
        let inputs: Vec<_> = none.inputs().collect();
        assert_eq!(*b.build(&none, &inputs).unwrap().returns(), ReturnSpec::None);

        let one = none
            .clone()
            .with_parameter(ParameterDescriptor::output("out", "net.imglib2.img.Img"));
        assert_eq!(
            *b.build(&one, &inputs).unwrap().returns(),
            ReturnSpec::Single(NativeType::Layer(DisplayKind::Image))
        );

        let two = one
            .clone()
            .with_parameter(ParameterDescriptor::output("count", "java.lang.Long"));
        assert_eq!(
            *b.build(&two, &inputs).unwrap().returns(),
            ReturnSpec::NamedResults
        );
        assert_eq!(
            b.build(&two, &inputs).unwrap().returns().native_type(),
            Some(NativeType::NamedResults)
        );
    }

    #[test]
    fn test_supplied_in_place_parameter_not_returned() {
        let cmd = CommandDescriptor::new("fill", "Fill")
            .with_parameter(ParameterDescriptor::both("image", "net.imglib2.img.Img"));
        let inputs: Vec<_> = cmd.inputs().collect();
        let signature = builder().build(&cmd, &inputs).unwrap();
        assert_eq!(*signature.returns(), ReturnSpec::None);
        assert_eq!(signature.to_string(), "(image: Image) -> None");
    }

    #[test]
    fn test_unresolvable_output_is_opaque() {
        let cmd = CommandDescriptor::new("a", "A")
            .with_parameter(ParameterDescriptor::output("thing", "org.example.Unknown"));
        let signature = builder().build(&cmd, &[]).unwrap();
        assert_eq!(*signature.returns(), ReturnSpec::Single(NativeType::ForeignObject));
    }

    #[test]
    fn test_external_display_only_for_non_displayable_outputs() {
        let b = builder().with_extension(Arc::new(ExternalDisplayOption::new(false)));

        let image = CommandDescriptor::new("a", "A")
            .with_parameter(ParameterDescriptor::output("out", "net.imglib2.img.Img"));
        let signature = b.build(&image, &[]).unwrap();
        assert_eq!(signature.synthetic_parameters().count(), 0);

        let stats = image
            .clone()
            .with_parameter(ParameterDescriptor::output("mean", "java.lang.Double"));
        let signature = b.build(&stats, &[]).unwrap();
        let flag = signature.parameter(EXTERNAL_DISPLAY_PARAMETER).unwrap();
        assert!(flag.synthetic);
        assert_eq!(flag.default, Some(NativeValue::Bool(false)));
        assert_eq!(
            signature.to_string(),
            "(display_results_in_new_window: bool = false) -> dict[str, object]"
        );
    }

    #[test]
    fn test_synthetic_parameters_trail() {
        let b = builder().with_extension(Arc::new(ExternalDisplayOption::new(true)));
        let cmd = CommandDescriptor::new("stats", "Image Statistics")
            .with_parameter(ParameterDescriptor::input("bins", "int").with_default(json!(256)))
            .with_parameter(ParameterDescriptor::input("image", "net.imglib2.img.Img"))
            .with_parameter(ParameterDescriptor::output("mean", "java.lang.Double"));
        let inputs: Vec<_> = cmd.inputs().collect();
        let signature = b.build(&cmd, &inputs).unwrap();

        let order: Vec<&str> = signature.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["image", "bins", EXTERNAL_DISPLAY_PARAMETER]);
        assert_eq!(signature.name(), "image_statistics");
        assert_eq!(signature.command_parameters().count(), 2);
        assert_eq!(
            signature.to_string(),
            "(image: Image, bins: int = 256, display_results_in_new_window: bool = true) -> float"
        );
    }
}
