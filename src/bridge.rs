//! Wrapping foreign commands as native invocables.

use crate::catalog::{CommandCatalog, CommandDescriptor};
use crate::conversion::{ConversionConfig, ConversionRegistry, TypeChecker, TypeResolver};
use crate::error::BridgeResult;
use crate::foreign::{ForeignRuntime, TypeOracle};
use crate::pipeline::{GeneratedInvocable, InvocationObserver, PipelineConfig, Session};
use crate::signature::{ExternalDisplayOption, Signature, SignatureBuilder, SignatureExtension};
use std::fmt;
use std::sync::Arc;

/// Entry point: turns [`CommandDescriptor`]s into [`GeneratedInvocable`]s.
///
/// # Example
///
/// ```
/// use cmdbridge::catalog::{CommandDescriptor, ParameterDescriptor};
/// use cmdbridge::foreign::memory::MemoryRuntime;
/// use cmdbridge::types::NativeValue;
/// use cmdbridge::Bridge;
/// use std::sync::Arc;
///
/// let runtime = MemoryRuntime::scientific().with_command("math.square", |ctx| {
///     let x = ctx.f64("x").unwrap_or_default();
///     ctx.set_value("result", NativeValue::Float(x * x))
/// });
/// let bridge = Bridge::new(Arc::new(runtime));
///
/// let square = CommandDescriptor::new("math.square", "Square")
///     .with_parameter(ParameterDescriptor::input("x", "java.lang.Double"))
///     .with_parameter(ParameterDescriptor::output("result", "java.lang.Double"));
///
/// let invocable = bridge.wrap(Arc::new(square)).unwrap();
/// assert_eq!(
///     invocable.signature().to_string(),
///     "(x: float, display_results_in_new_window: bool = false) -> float"
/// );
///
/// let outcome = invocable.invoke(vec![Some(NativeValue::Float(3.0))]).unwrap();
/// assert_eq!(outcome.non_displayable[0].value, NativeValue::Float(9.0));
/// ```
#[derive(Clone)]
pub struct Bridge {
    runtime: Arc<dyn ForeignRuntime>,
    resolver: Arc<TypeResolver>,
    signatures: SignatureBuilder,
    config: Arc<PipelineConfig>,
    observer: Option<Arc<dyn InvocationObserver>>,
}

impl Bridge {
    /// A bridge over `runtime` with the standard conversion table and the
    /// default pipeline configuration.
    pub fn new<R: ForeignRuntime + 'static>(runtime: Arc<R>) -> Self {
        Self::builder(runtime).build()
    }

    /// Start configuring a bridge over `runtime`.
    pub fn builder<R: ForeignRuntime + 'static>(runtime: Arc<R>) -> BridgeBuilder {
        let oracle: Arc<dyn TypeOracle> = runtime.clone();
        BridgeBuilder {
            runtime,
            oracle,
            registry: None,
            conversion: ConversionConfig::default(),
            checkers: Vec::new(),
            extensions: Vec::new(),
            config: PipelineConfig::default(),
            observer: None,
        }
    }

    /// The resolver used for parameter types.
    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The foreign runtime.
    pub fn runtime(&self) -> &Arc<dyn ForeignRuntime> {
        &self.runtime
    }

    /// Create a session for `descriptor`, preprocess it up to the input
    /// harvester and build its signature.
    ///
    /// Fails with `UnsupportedType` when a parameter the caller must supply
    /// has no native type; other commands are unaffected.
    pub fn wrap(&self, descriptor: Arc<CommandDescriptor>) -> BridgeResult<GeneratedInvocable> {
        let mut session = Session::create(
            descriptor,
            Arc::clone(&self.runtime),
            Arc::clone(&self.config),
        )?;
        session.preprocess_to_harvester()?;

        let signature = self.signature_for(&session)?;
        session.await_input()?;

        tracing::debug!(
            command = %session.descriptor().identifier,
            signature = %signature,
            "wrapped command"
        );
        Ok(GeneratedInvocable::new(
            session,
            signature,
            self.observer.clone(),
        ))
    }

    fn signature_for(&self, session: &Session) -> BridgeResult<Signature> {
        let interactive = session.interactive_parameters(&self.resolver);
        self.signatures.build(session.descriptor(), &interactive)
    }

    /// Wrap every command of `catalog`, in identifier order. A failure
    /// only affects its own command.
    pub fn wrap_all(
        &self,
        catalog: &dyn CommandCatalog,
    ) -> Vec<(String, BridgeResult<GeneratedInvocable>)> {
        catalog
            .list()
            .into_iter()
            .map(|descriptor| {
                let identifier = descriptor.identifier.clone();
                let wrapped = self.wrap(descriptor);
                if let Err(e) = &wrapped {
                    tracing::warn!(command = %identifier, error = %e, "cannot wrap command");
                }
                (identifier, wrapped)
            })
            .collect()
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("signatures", &self.signatures)
            .field("config", &self.config)
            .finish()
    }
}

/// Configures a [`Bridge`].
pub struct BridgeBuilder {
    runtime: Arc<dyn ForeignRuntime>,
    oracle: Arc<dyn TypeOracle>,
    registry: Option<Arc<ConversionRegistry>>,
    conversion: ConversionConfig,
    checkers: Vec<Box<dyn TypeChecker>>,
    extensions: Vec<Arc<dyn SignatureExtension>>,
    config: PipelineConfig,
    observer: Option<Arc<dyn InvocationObserver>>,
}

impl BridgeBuilder {
    /// Use `registry` instead of the standard table.
    pub fn registry(mut self, registry: Arc<ConversionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Options for the standard table.
    pub fn conversion(mut self, conversion: ConversionConfig) -> Self {
        self.conversion = conversion;
        self
    }

    /// Consult `checker` in addition to the built-in checkers.
    pub fn checker(mut self, checker: Box<dyn TypeChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Append a signature extension after the built-in one.
    pub fn extension(mut self, extension: Arc<dyn SignatureExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Pipeline configuration.
    pub fn pipeline(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Notify `observer` around every invocation.
    pub fn observer(mut self, observer: Arc<dyn InvocationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the bridge.
    pub fn build(self) -> Bridge {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ConversionRegistry::standard(&self.conversion)));

        let mut checkers = TypeResolver::default_checkers();
        checkers.extend(self.checkers);
        let resolver = Arc::new(TypeResolver::with_checkers(registry, self.oracle, checkers));

        let mut signatures = SignatureBuilder::new(Arc::clone(&resolver)).with_extension(Arc::new(
            ExternalDisplayOption::new(self.config.display_results_in_new_window),
        ));
        for extension in self.extensions {
            signatures = signatures.with_extension(extension);
        }

        Bridge {
            runtime: self.runtime,
            resolver,
            signatures,
            config: Arc::new(self.config),
            observer: self.observer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DefaultCommandCatalog, ParameterDescriptor};
    use crate::error::BridgeError;
    use crate::foreign::memory::MemoryRuntime;
    use crate::pipeline::SessionState;
    use crate::signature::ParameterSpec;
    use crate::types::{NativeType, NativeValue};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn scale() -> CommandDescriptor {
        CommandDescriptor::new("math.scale", "Scale")
            .with_parameter(ParameterDescriptor::input("factor", "java.lang.Double").with_default(json!(2)))
            .with_parameter(ParameterDescriptor::input("value", "java.lang.Double"))
            .with_parameter(ParameterDescriptor::output("scaled", "java.lang.Double"))
    }

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::scientific().with_command("math.scale", |ctx| {
            let v = ctx.f64("value").unwrap_or_default() * ctx.f64("factor").unwrap_or(1.0);
            ctx.set_value("scaled", NativeValue::Float(v))
        })
    }

    #[test]
    fn test_wrap_awaits_input() {
        let bridge = Bridge::new(Arc::new(runtime()));
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();
        assert_eq!(invocable.state(), SessionState::AwaitingUserInput);
        assert_eq!(invocable.name(), "scale");
        assert_eq!(
            invocable.signature().to_string(),
            "(value: float, factor: float = 2, display_results_in_new_window: bool = false) -> float"
        );
    }

    #[test]
    fn test_bind_named_fills_defaults() {
        let bridge = Bridge::new(Arc::new(runtime()));
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();

        let args = HashMap::from([("value".to_string(), NativeValue::Float(4.0))]);
        let positional = invocable.bind_named(args).unwrap();
        assert_eq!(
            positional,
            vec![
                Some(NativeValue::Float(4.0)),
                Some(NativeValue::Float(2.0)),
                Some(NativeValue::Bool(false)),
            ]
        );

        let outcome = invocable
            .invoke_named(HashMap::from([
                ("value".to_string(), NativeValue::Float(4.0)),
                ("display_results_in_new_window".to_string(), NativeValue::Bool(true)),
            ]))
            .unwrap();
        assert_eq!(outcome.non_displayable[0].value, NativeValue::Float(8.0));
        assert_eq!(outcome.display_externally, Some(true));
        assert_eq!(outcome.results_title(), "Result: Scale");
    }

    #[test]
    fn test_bind_named_rejects_unknown() {
        let bridge = Bridge::new(Arc::new(runtime()));
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();
        let args = HashMap::from([
            ("value".to_string(), NativeValue::Float(1.0)),
            ("sigma".to_string(), NativeValue::Float(1.0)),
        ]);
        match invocable.bind_named(args).unwrap_err() {
            BridgeError::UnknownArgument { command, name } => {
                assert_eq!(command, "scale");
                assert_eq!(name, "sigma");
            }
            other => panic!("Expected UnknownArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_too_many_positional_arguments() {
        let bridge = Bridge::new(Arc::new(runtime()));
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();
        let err = invocable.invoke(vec![None, None, None, None]).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownArgument { .. }));
    }

    #[test]
    fn test_wrap_all_isolates_failures() {
        let catalog: DefaultCommandCatalog = vec![
            scale(),
            CommandDescriptor::new("math.broken", "Broken")
                .with_parameter(ParameterDescriptor::input("thing", "org.example.Thing")),
        ]
        .into_iter()
        .collect();

        let bridge = Bridge::new(Arc::new(runtime().with_command("math.broken", |_| Ok(()))));
        let wrapped = bridge.wrap_all(&catalog);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].0, "math.broken");
        assert!(matches!(wrapped[0].1, Err(BridgeError::UnsupportedType { .. })));
        assert!(wrapped[1].1.is_ok());
    }

    struct AlwaysOne;

    impl SignatureExtension for AlwaysOne {
        fn name(&self) -> &str {
            "always_one"
        }

        fn parameters(
            &self,
            _descriptor: &CommandDescriptor,
            _outputs: &[crate::signature::ReturnedOutput<'_>],
        ) -> Vec<ParameterSpec> {
            vec![ParameterSpec::synthetic("one", NativeType::Int, NativeValue::Int(1))]
        }
    }

    #[test]
    fn test_custom_extension_after_builtin() {
        let bridge = Bridge::builder(Arc::new(runtime()))
            .extension(Arc::new(AlwaysOne))
            .build();
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();
        let names: Vec<&str> = invocable
            .signature()
            .synthetic_parameters()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["display_results_in_new_window", "one"]);
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl InvocationObserver for Recorder {
        fn invocation_started(
            &self,
            signature: &Signature,
            arguments: &[(String, Option<NativeValue>)],
        ) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", signature.name(), arguments.len()));
        }

        fn invocation_finished(&self, signature: &Signature, _outcome: &crate::pipeline::InvocationOutcome) {
            self.events.lock().unwrap().push(format!("done {}", signature.name()));
        }

        fn invocation_failed(&self, signature: &Signature, _error: &BridgeError) {
            self.events.lock().unwrap().push(format!("failed {}", signature.name()));
        }
    }

    #[test]
    fn test_observer_notified() {
        let recorder = Arc::new(Recorder::default());
        let bridge = Bridge::builder(Arc::new(runtime()))
            .observer(recorder.clone())
            .build();

        bridge
            .wrap(Arc::new(scale()))
            .unwrap()
            .invoke(vec![Some(NativeValue::Float(1.0))])
            .unwrap();
        bridge
            .wrap(Arc::new(scale()))
            .unwrap()
            .invoke(vec![])
            .unwrap_err();

        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start scale 2", "done scale", "start scale 2", "failed scale"]
        );
    }

    #[test]
    fn test_custom_registry_and_checker() {
        use crate::conversion::{priority, ConversionRegistry};

        struct Fallback;
        impl TypeChecker for Fallback {
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
                Some(NativeType::ForeignObject)
            }
        }

        let bridge = Bridge::builder(Arc::new(runtime()))
            .registry(Arc::new(ConversionRegistry::default()))
            .checker(Box::new(Fallback))
            .build();
        assert_eq!(
            bridge.resolver().checker_names(),
            vec!["exact", "assignable", "standin", "convertible", "fallback"]
        );
        let invocable = bridge.wrap(Arc::new(scale())).unwrap();
        assert_eq!(
            invocable.signature().parameter("value").unwrap().native_type,
            NativeType::ForeignObject
        );
    }
}
