//! Resolves parameters to native types.

use crate::catalog::ParameterDescriptor;
use crate::conversion::checkers::{
    AssignabilityChecker, ConversionChecker, ExactTypeChecker, StandinChecker, TypeChecker,
};
use crate::conversion::ConversionRegistry;
use crate::error::{BridgeError, BridgeResult};
use crate::foreign::TypeOracle;
use crate::types::NativeType;
use std::cmp::Reverse;
use std::sync::Arc;

/// Resolves a parameter's native type through priority-ordered checkers.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::ParameterDescriptor;
/// use cmdbridge::conversion::{ConversionConfig, ConversionRegistry, TypeResolver};
/// use cmdbridge::foreign::memory::MemoryRuntime;
/// use cmdbridge::types::NativeType;
/// use std::sync::Arc;
///
/// let resolver = TypeResolver::new(
///     Arc::new(ConversionRegistry::standard(&ConversionConfig::default())),
///     Arc::new(MemoryRuntime::scientific()),
/// );
///
/// let param = ParameterDescriptor::input("threshold", "java.lang.Number");
/// assert_eq!(resolver.resolve(&param).unwrap(), NativeType::Float);
/// ```
pub struct TypeResolver {
    registry: Arc<ConversionRegistry>,
    oracle: Arc<dyn TypeOracle>,
    checkers: Vec<Box<dyn TypeChecker>>,
}

impl TypeResolver {
    /// A resolver using the built-in checkers.
    pub fn new(registry: Arc<ConversionRegistry>, oracle: Arc<dyn TypeOracle>) -> Self {
        Self::with_checkers(registry, oracle, Self::default_checkers())
    }

    /// A resolver using `checkers`, sorted highest priority first.
    pub fn with_checkers(
        registry: Arc<ConversionRegistry>,
        oracle: Arc<dyn TypeOracle>,
        mut checkers: Vec<Box<dyn TypeChecker>>,
    ) -> Self {
        checkers.sort_by_key(|c| Reverse(c.priority()));
        Self {
            registry,
            oracle,
            checkers,
        }
    }

    /// Exact, assignable, standin and convertible checkers.
    pub fn default_checkers() -> Vec<Box<dyn TypeChecker>> {
        vec![
            Box::new(ExactTypeChecker),
            Box::new(AssignabilityChecker),
            Box::new(StandinChecker),
            Box::new(ConversionChecker),
        ]
    }

    /// Add a host-specific checker.
    pub fn add_checker(&mut self, checker: Box<dyn TypeChecker>) {
        self.checkers.push(checker);
        self.checkers.sort_by_key(|c| Reverse(c.priority()));
    }

    /// The registry being consulted.
    pub fn registry(&self) -> &ConversionRegistry {
        &self.registry
    }

    /// Checker names in consultation order.
    pub fn checker_names(&self) -> Vec<&str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    /// The native type for `param`, if any checker finds one.
    pub fn try_resolve(&self, param: &ParameterDescriptor) -> Option<NativeType> {
        for checker in &self.checkers {
            if let Some(native) = checker.check(param, &self.registry, self.oracle.as_ref()) {
                tracing::trace!(
                    parameter = %param.name,
                    foreign_type = %param.foreign_type,
                    checker = checker.name(),
                    native_type = %native,
                    "resolved parameter type"
                );
                return Some(native);
            }
        }
        None
    }

    /// The native type for `param`, or `UnsupportedType`.
    pub fn resolve(&self, param: &ParameterDescriptor) -> BridgeResult<NativeType> {
        self.try_resolve(param)
            .ok_or_else(|| BridgeError::unsupported_type(&param.name, param.foreign_type.clone()))
    }
}

impl std::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeResolver")
            .field("entries", &self.registry.len())
            .field("checkers", &self.checker_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Direction;
    use crate::conversion::{priority, Category, ConversionConfig};
    use crate::foreign::memory::MemoryRuntime;
    use crate::types::{DisplayKind, StandinKind};

    fn standard_resolver() -> TypeResolver {
        TypeResolver::new(
            Arc::new(ConversionRegistry::standard(&ConversionConfig::default())),
            Arc::new(MemoryRuntime::scientific()),
        )
    }

    #[test]
    fn test_every_entry_resolves_to_its_pair() {
        let resolver = standard_resolver();
        for entry in resolver.registry().entries() {
            for direction in [Direction::InputOnly, Direction::OutputOnly, Direction::Both] {
                let param = ParameterDescriptor::new("p", entry.foreign_type().clone(), direction);
                assert_eq!(
                    resolver.resolve(&param).unwrap(),
                    *entry.native_type(),
                    "{} ({})",
                    entry.foreign_type(),
                    direction
                );
            }
        }
    }

    #[test]
    fn test_unsupported_type() {
        let resolver = standard_resolver();
        let param = ParameterDescriptor::input("mystery", "org.example.Mystery");
        match resolver.resolve(&param).unwrap_err() {
            BridgeError::UnsupportedType { parameter, foreign_type } => {
                assert_eq!(parameter, "mystery");
                assert_eq!(foreign_type.name(), "org.example.Mystery");
            }
            other => panic!("Expected UnsupportedType error, got {other:?}"),
        }
    }

    #[test]
    fn test_subtype_output_resolves_through_hierarchy() {
        let resolver = standard_resolver();
        let param = ParameterDescriptor::output("out", "net.imagej.ImgPlus");
        assert_eq!(
            resolver.resolve(&param).unwrap(),
            NativeType::Layer(DisplayKind::Image)
        );
    }

    #[test]
    fn test_standin_resolution() {
        let resolver = standard_resolver();
        let param = ParameterDescriptor::input("oob", StandinKind::OutOfBoundsFactory.foreign_type());
        assert_eq!(
            resolver.resolve(&param).unwrap(),
            NativeType::Standin(StandinKind::OutOfBoundsFactory)
        );

        let output = ParameterDescriptor::output("oob", StandinKind::OutOfBoundsFactory.foreign_type());
        assert!(resolver.try_resolve(&output).is_none());
    }

    struct EverythingIsAString;

    impl TypeChecker for EverythingIsAString {
        fn name(&self) -> &str {
            "fallback"
        }

        fn priority(&self) -> i32 {
            priority::LAST
        }

        fn check(
            &self,
            _param: &ParameterDescriptor,
            _registry: &ConversionRegistry,
            _oracle: &dyn TypeOracle,
        ) -> Option<NativeType> {
            Some(NativeType::Str)
        }
    }

    #[test]
    fn test_custom_checker_sorted_last() {
        let mut resolver = standard_resolver();
        resolver.add_checker(Box::new(EverythingIsAString));
        assert_eq!(
            resolver.checker_names(),
            vec!["exact", "assignable", "standin", "convertible", "fallback"]
        );

        let param = ParameterDescriptor::input("mystery", "org.example.Mystery");
        assert_eq!(resolver.resolve(&param).unwrap(), NativeType::Str);
        let known = ParameterDescriptor::input("n", "java.lang.Integer");
        assert_eq!(resolver.resolve(&known).unwrap(), NativeType::Int);
    }

    #[test]
    fn test_boolean_never_captured_as_number() {
        let mut builder = ConversionRegistry::builder();
        builder
            .register(Category::Number, "test.Flag", NativeType::Int, priority::NORMAL)
            .register(Category::Boolean, "test.Flag", NativeType::Bool, priority::NORMAL);
        let resolver = TypeResolver::new(Arc::new(builder.build()), Arc::new(MemoryRuntime::new()));

        let param = ParameterDescriptor::input("flag", "test.Flag");
        assert_eq!(resolver.resolve(&param).unwrap(), NativeType::Bool);
    }
}
