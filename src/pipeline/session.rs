//! The per-invocation session state machine.

use crate::catalog::{CommandDescriptor, ParameterDescriptor};
use crate::conversion::TypeResolver;
use crate::error::{BridgeError, BridgeResult};
use crate::foreign::{CommandInstance, ForeignError, ForeignRuntime, ModuleStage};
use crate::pipeline::{PipelineConfig, PostprocessFailurePolicy, SessionState};
use crate::types::{NativeValue, StandinKind};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A postprocessing stage failure recorded under
/// [`PostprocessFailurePolicy::Isolate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFailure {
    /// Stage name.
    pub stage: String,
    /// Short failure message.
    pub message: String,
    /// Foreign stack trace, verbatim.
    pub trace: String,
}

impl StageFailure {
    fn new(stage: &str, error: ForeignError) -> Self {
        Self {
            stage: stage.to_string(),
            message: error.message,
            trace: error.trace,
        }
    }
}

/// One invocation of one command.
///
/// A session owns its command instance and is never reused: once it
/// reaches [`Done`](SessionState::Done) or [`Errored`](SessionState::Errored)
/// it can only be dropped. Dropping it disposes the instance.
pub struct Session {
    id: Uuid,
    descriptor: Arc<CommandDescriptor>,
    instance: Box<dyn CommandInstance>,
    runtime: Arc<dyn ForeignRuntime>,
    config: Arc<PipelineConfig>,
    pending: Vec<Box<dyn ModuleStage>>,
    state: SessionState,
}

impl Session {
    /// Instantiate `descriptor` in `runtime`.
    pub fn create(
        descriptor: Arc<CommandDescriptor>,
        runtime: Arc<dyn ForeignRuntime>,
        config: Arc<PipelineConfig>,
    ) -> BridgeResult<Self> {
        let instance = runtime
            .instantiate(&descriptor)
            .map_err(|e| BridgeError::instantiation(&descriptor.identifier, e))?;
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, command = %descriptor.identifier, "session created");
        Ok(Self {
            id,
            descriptor,
            instance,
            runtime,
            config,
            pending: Vec::new(),
            state: SessionState::Created,
        })
    }

    /// Unique session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The command being invoked.
    pub fn descriptor(&self) -> &Arc<CommandDescriptor> {
        &self.descriptor
    }

    /// The underlying command instance.
    pub fn instance(&self) -> &dyn CommandInstance {
        self.instance.as_ref()
    }

    /// Names of the preprocessing stages deferred until inputs are bound.
    pub fn pending_stages(&self) -> Vec<&str> {
        self.pending.iter().map(|s| s.name()).collect()
    }

    /// Move to `to`. Re-entering a state, skipping ahead and moving
    /// backwards are refused.
    pub fn transition(&mut self, to: SessionState) -> BridgeResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(BridgeError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(
            session = %self.id,
            command = %self.descriptor.identifier,
            from = %self.state,
            to = %to,
            "session transition"
        );
        self.state = to;
        Ok(())
    }

    fn expect_state(&self, expected: SessionState) -> BridgeResult<()> {
        if self.state == expected {
            return Ok(());
        }
        Err(BridgeError::InvalidTransition {
            from: self.state,
            to: expected.next().unwrap_or(SessionState::Errored),
        })
    }

    fn fail(&mut self, error: BridgeError) -> BridgeError {
        if !self.state.is_terminal() {
            tracing::warn!(
                session = %self.id,
                command = %self.descriptor.identifier,
                from = %self.state,
                error = %error,
                "session failed"
            );
            self.state = SessionState::Errored;
        }
        error
    }

    fn guard<T>(&mut self, result: BridgeResult<T>) -> BridgeResult<T> {
        result.map_err(|e| self.fail(e))
    }

    /// Run preprocessing stages in order, stopping at the first harvester.
    /// The harvester and everything after it run in
    /// [`resolve_inputs`](Self::resolve_inputs).
    pub fn preprocess_to_harvester(&mut self) -> BridgeResult<()> {
        self.expect_state(SessionState::Created)?;
        let mut stages = self.runtime.preprocessors().into_iter();

        while let Some(stage) = stages.next() {
            if stage.is_harvester() {
                tracing::debug!(stage = stage.name(), "stopping at harvester");
                self.pending.push(stage);
                break;
            }
            if let Err(e) = stage.process(self.instance.as_mut()) {
                let error = BridgeError::command_fault(&self.descriptor.identifier, e);
                return Err(self.fail(error));
            }
        }
        self.pending.extend(stages);

        self.transition(SessionState::PreprocessedToHarvest)
    }

    /// The parameters the caller must supply, in declaration order.
    ///
    /// Excludes inputs resolved by preprocessing, optional outputs the
    /// command allocates itself and optional parameters with no native
    /// type. Required parameters with no native type stay in the set so
    /// that building a signature for them fails.
    pub fn interactive_parameters(&self, resolver: &TypeResolver) -> Vec<&ParameterDescriptor> {
        self.descriptor
            .inputs()
            .filter(|p| !self.instance.is_input_resolved(&p.name))
            .filter(|p| {
                if p.direction.is_output() && !p.required {
                    tracing::debug!(parameter = %p.name, "leaving optional output to the command");
                    return false;
                }
                if !p.required && resolver.try_resolve(p).is_none() {
                    tracing::debug!(
                        parameter = %p.name,
                        foreign_type = %p.foreign_type,
                        "dropping optional parameter with no native type"
                    );
                    return false;
                }
                true
            })
            .collect()
    }

    /// Mark the session as waiting for arguments.
    pub fn await_input(&mut self) -> BridgeResult<()> {
        self.transition(SessionState::AwaitingUserInput)
    }

    /// Bind the caller's arguments, fill declared defaults, skip unsupplied
    /// optional inputs and run the deferred preprocessing stages.
    pub fn resolve_inputs(&mut self, arguments: &[(String, Option<NativeValue>)]) -> BridgeResult<()> {
        self.expect_state(SessionState::AwaitingUserInput)?;
        let result = self.bind_and_resolve(arguments);
        self.guard(result)?;
        self.transition(SessionState::InputsResolved)
    }

    fn bind_and_resolve(&mut self, arguments: &[(String, Option<NativeValue>)]) -> BridgeResult<()> {
        let descriptor = Arc::clone(&self.descriptor);

        let mut supplied: HashMap<&str, &NativeValue> = HashMap::new();
        for (name, value) in arguments {
            if descriptor.parameter(name).is_none() {
                return Err(BridgeError::unknown_argument(descriptor.invocable_name(), name));
            }
            if let Some(value) = value.as_ref().filter(|v| !v.is_none()) {
                supplied.insert(name.as_str(), value);
            }
        }

        for param in descriptor.inputs() {
            let value = match supplied.get(param.name.as_str()) {
                Some(value) => Some((*value).clone()),
                None if self.instance.is_input_resolved(&param.name) => continue,
                None => declared_default(param),
            };
            match value {
                Some(value) => {
                    let foreign = self.to_foreign(param, &value)?;
                    self.instance.set_input(&param.name, foreign);
                    self.instance.resolve_input(&param.name);
                }
                None if param.required => {
                    return Err(BridgeError::missing_required_input(&param.name));
                }
                None => {
                    tracing::debug!(parameter = %param.name, "skipping unresolved optional input");
                    self.instance.resolve_input(&param.name);
                }
            }
        }

        for stage in std::mem::take(&mut self.pending) {
            stage
                .process(self.instance.as_mut())
                .map_err(|e| BridgeError::command_fault(&descriptor.identifier, e))?;
        }

        let unresolved = descriptor
            .inputs()
            .find(|p| p.required && !self.instance.is_input_resolved(&p.name));
        match unresolved {
            Some(param) => Err(BridgeError::unresolved_required_input(
                &param.name,
                param.foreign_type.clone(),
            )),
            None => Ok(()),
        }
    }

    fn to_foreign(
        &self,
        param: &ParameterDescriptor,
        value: &NativeValue,
    ) -> BridgeResult<crate::foreign::ForeignObject> {
        let mismatch = || {
            BridgeError::type_mismatch(&param.name, param.foreign_type.clone(), value.kind_name())
        };
        match value {
            NativeValue::Choice(choice) => {
                let class = choice.foreign_class();
                if !self.runtime.is_assignable(&class, &param.foreign_type) {
                    return Err(mismatch());
                }
                self.runtime
                    .construct(&class)
                    .map_err(|e| BridgeError::command_fault(&self.descriptor.identifier, e))
            }
            other => self
                .runtime
                .to_foreign(other, &param.foreign_type)
                .ok_or_else(mismatch),
        }
    }

    /// Initialize and run the command. Nothing is rolled back on failure.
    pub fn run(&mut self) -> BridgeResult<()> {
        self.expect_state(SessionState::InputsResolved)?;
        let command = self.descriptor.identifier.clone();

        let result = self
            .instance
            .initialize()
            .map_err(|e| BridgeError::command_fault(&command, e));
        self.guard(result)?;
        self.transition(SessionState::Initialized)?;

        let result = self
            .instance
            .run()
            .map_err(|e| BridgeError::command_fault(&command, e));
        self.guard(result)?;
        self.transition(SessionState::Ran)
    }

    /// Run every postprocessing stage that is not denylisted.
    ///
    /// Under [`PostprocessFailurePolicy::Isolate`] failures are returned
    /// instead of aborting the session.
    pub fn postprocess(&mut self) -> BridgeResult<Vec<StageFailure>> {
        self.expect_state(SessionState::Ran)?;
        let mut failures = Vec::new();

        for stage in self.runtime.postprocessors() {
            if self.config.is_denylisted(stage.name()) {
                tracing::debug!(stage = stage.name(), "skipping denylisted postprocessor");
                continue;
            }
            let Err(e) = stage.process(self.instance.as_mut()) else {
                continue;
            };
            match self.config.postprocess_failure {
                PostprocessFailurePolicy::FailFast => {
                    let error = BridgeError::postprocessing_fault(
                        &self.descriptor.identifier,
                        stage.name(),
                        e,
                    );
                    return Err(self.fail(error));
                }
                PostprocessFailurePolicy::Isolate => {
                    tracing::warn!(
                        command = %self.descriptor.identifier,
                        stage = stage.name(),
                        error = %e,
                        "postprocessor failed"
                    );
                    failures.push(StageFailure::new(stage.name(), e));
                }
            }
        }

        self.transition(SessionState::Postprocessed)?;
        Ok(failures)
    }

    /// Outputs converted to host values, in declaration order.
    /// Outputs the command did not produce come back as `None`.
    pub fn outputs(&self) -> Vec<(String, NativeValue)> {
        self.instance
            .outputs()
            .into_iter()
            .map(|(name, value)| {
                let value = value
                    .map(|obj| self.runtime.to_native(&obj))
                    .unwrap_or(NativeValue::None);
                (name, value)
            })
            .collect()
    }

    /// Names of outputs that hand back the very foreign object bound to
    /// the same parameter as input.
    pub fn returned_inputs(&self) -> HashSet<String> {
        self.instance
            .outputs()
            .into_iter()
            .filter_map(|(name, value)| {
                let input = self.instance.input(&name)?;
                value?.same_object(&input).then_some(name)
            })
            .collect()
    }

    /// Mark outputs as extracted.
    pub fn finish(&mut self) -> BridgeResult<()> {
        self.transition(SessionState::Done)
    }
}

/// The declared default of `param` as a host value. Standin defaults are
/// declared by label.
fn declared_default(param: &ParameterDescriptor) -> Option<NativeValue> {
    let value = NativeValue::from_json(param.default_value.as_ref()?);
    let value = match (value, StandinKind::for_foreign_type(&param.foreign_type)) {
        (NativeValue::Str(label), Some(kind)) => match kind.choice_for_label(&label) {
            Some(choice) => NativeValue::Choice(choice),
            None => NativeValue::Str(label),
        },
        (value, _) => value,
    };
    (!value.is_none()).then_some(value)
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!(session = %self.id, state = %self.state, "disposing command instance");
        self.instance.dispose();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("command", &self.descriptor.identifier)
            .field("state", &self.state)
            .field("pending", &self.pending_stages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{ConversionConfig, ConversionRegistry};
    use crate::foreign::memory::{FnStage, MemoryRuntime, CONTEXT_TYPE};
    use crate::types::{NdArray, StandinChoice};
    use serde_json::json;

    fn threshold() -> CommandDescriptor {
        CommandDescriptor::new("threshold.apply", "Apply Threshold")
            .with_parameter(ParameterDescriptor::input("context", CONTEXT_TYPE))
            .with_parameter(ParameterDescriptor::input("threshold", "java.lang.Number"))
            .with_parameter(
                ParameterDescriptor::input("smooth", "java.lang.Boolean").with_default(json!(false)),
            )
            .with_parameter(ParameterDescriptor::input("gizmo", "org.example.Gizmo").optional())
            .with_parameter(ParameterDescriptor::both("scratch", "net.imglib2.img.Img").optional())
            .with_parameter(ParameterDescriptor::output("mask", "net.imglib2.img.Img"))
    }

    fn runtime() -> MemoryRuntime {
        MemoryRuntime::scientific().with_command("threshold.apply", |ctx| {
            let level = ctx.f64("threshold").unwrap_or(0.0);
            let mask = NdArray::new(vec![1], vec![level]).unwrap_or_else(|| NdArray::zeros(vec![1]));
            ctx.set_value("mask", mask.into())
        })
    }

    fn resolver(runtime: &MemoryRuntime) -> TypeResolver {
        TypeResolver::new(
            Arc::new(ConversionRegistry::standard(&ConversionConfig::default())),
            Arc::new(runtime.clone()),
        )
    }

    fn session_with(runtime: MemoryRuntime, config: PipelineConfig) -> Session {
        Session::create(Arc::new(threshold()), Arc::new(runtime), Arc::new(config)).unwrap()
    }

    fn arg(name: &str, value: impl Into<NativeValue>) -> (String, Option<NativeValue>) {
        (name.to_string(), Some(value.into()))
    }

    #[test]
    fn test_interactive_set() {
        let rt = runtime();
        let resolver = resolver(&rt);
        let mut session = session_with(rt, PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();

        let names: Vec<&str> = session
            .interactive_parameters(&resolver)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["threshold", "smooth"]);
        assert_eq!(session.pending_stages(), vec!["InputHarvester"]);
    }

    #[test]
    fn test_full_run() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session
            .resolve_inputs(&[arg("threshold", 1.5), arg("smooth", false)])
            .unwrap();
        assert_eq!(session.state(), SessionState::InputsResolved);
        assert!(session.instance().is_input_resolved("gizmo"));
        assert!(session.instance().is_input_resolved("scratch"));

        session.run().unwrap();
        assert!(session.postprocess().unwrap().is_empty());

        let outputs = session.outputs();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].0, "scratch");
        assert!(outputs[0].1.is_none());
        match &outputs[1].1 {
            NativeValue::Array(mask) => assert_eq!(mask.data(), &[1.5]),
            other => panic!("Expected array, got {other:?}"),
        }
        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Done);
    }

    #[test]
    fn test_missing_required_input() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        let err = session
            .resolve_inputs(&[("threshold".to_string(), None)])
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingRequiredInput { parameter } if parameter == "threshold"));
        assert_eq!(session.state(), SessionState::Errored);
    }

    #[test]
    fn test_type_mismatch() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        let err = session
            .resolve_inputs(&[arg("threshold", "high")])
            .unwrap_err();
        match err {
            BridgeError::TypeMismatch { parameter, found, .. } => {
                assert_eq!(parameter, "threshold");
                assert_eq!(found, "str");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_omitted_required_input_is_missing() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        let err = session.resolve_inputs(&[arg("smooth", true)]).unwrap_err();
        assert!(matches!(err, BridgeError::MissingRequiredInput { parameter } if parameter == "threshold"));
        assert_eq!(session.state(), SessionState::Errored);
    }

    #[test]
    fn test_declared_defaults_bound() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[arg("threshold", 1.5)]).unwrap();

        let smooth = session.instance().input("smooth").unwrap();
        assert_eq!(smooth.downcast_ref::<NativeValue>(), Some(&NativeValue::Bool(false)));
        assert!(session.instance().is_input_resolved("smooth"));
        assert!(session.instance().input("gizmo").is_none());
    }

    #[test]
    fn test_standin_default_bound_by_label() {
        let cmd = CommandDescriptor::new("filter.median", "Median").with_parameter(
            ParameterDescriptor::input("oob", StandinKind::OutOfBoundsFactory.foreign_type())
                .with_default(json!("Periodic")),
        );
        let rt = MemoryRuntime::scientific().with_command("filter.median", |_| Ok(()));
        let mut session =
            Session::create(Arc::new(cmd), Arc::new(rt), Arc::new(PipelineConfig::default()))
                .unwrap();
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[("oob".to_string(), None)]).unwrap();
        assert_eq!(
            session.instance().input("oob").unwrap().foreign_type().name(),
            "net.imglib2.outofbounds.OutOfBoundsPeriodicFactory"
        );
    }

    #[test]
    fn test_out_of_order_calls_refused() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        assert!(matches!(
            session.run(),
            Err(BridgeError::InvalidTransition { from: SessionState::Created, .. })
        ));
        // refusing does not poison the session
        assert_eq!(session.state(), SessionState::Created);
        assert!(session.transition(SessionState::Ran).is_err());
        session.preprocess_to_harvester().unwrap();
        assert!(session.preprocess_to_harvester().is_err());
    }

    #[test]
    fn test_returned_inputs_by_identity() {
        let cmd = CommandDescriptor::new("text.trim", "Trim")
            .with_parameter(ParameterDescriptor::both("label", "java.lang.String"))
            .with_parameter(ParameterDescriptor::both("note", "java.lang.String"));
        let rt = MemoryRuntime::scientific().with_command("text.trim", |ctx| {
            let note = ctx.value("note").map(ToString::to_string).unwrap_or_default();
            ctx.set_value("note", NativeValue::Str(note.trim().to_string()))
        });
        let mut session =
            Session::create(Arc::new(cmd), Arc::new(rt), Arc::new(PipelineConfig::default()))
                .unwrap();
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session
            .resolve_inputs(&[arg("label", "cells"), arg("note", " kept ")])
            .unwrap();
        session.run().unwrap();

        let returned = session.returned_inputs();
        assert!(returned.contains("label"));
        assert!(!returned.contains("note"));
    }

    #[test]
    fn test_command_fault_keeps_trace() {
        let rt = MemoryRuntime::scientific().with_command("threshold.apply", |_| {
            Err(ForeignError::with_trace("boom", "java.lang.IllegalStateException: boom"))
        });
        let mut session = session_with(rt, PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[arg("threshold", 1)]).unwrap();

        let err = session.run().unwrap_err();
        assert_eq!(err.trace(), Some("java.lang.IllegalStateException: boom"));
        assert_eq!(session.state(), SessionState::Errored);
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_preprocessor_failure() {
        let rt = runtime().with_preprocessor(FnStage::new("Broken", |_| {
            Err(ForeignError::new("nope"))
        }));
        // ServiceInjector, InputHarvester, Broken: Broken is deferred
        let mut session = session_with(rt, PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        assert_eq!(session.pending_stages(), vec!["InputHarvester", "Broken"]);
        session.await_input().unwrap();
        let err = session.resolve_inputs(&[arg("threshold", 1)]).unwrap_err();
        assert!(matches!(err, BridgeError::CommandFault { .. }));
    }

    #[test]
    fn test_denylisted_postprocessor_skipped() {
        let mut session = session_with(runtime(), PipelineConfig::default());
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[arg("threshold", 1)]).unwrap();
        session.run().unwrap();
        assert!(session.postprocess().is_ok());
    }

    #[test]
    fn test_postprocess_fail_fast() {
        let config = PipelineConfig {
            postprocessor_denylist: Vec::new(),
            ..PipelineConfig::default()
        };
        let mut session = session_with(runtime(), config);
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[arg("threshold", 1)]).unwrap();
        session.run().unwrap();

        let err = session.postprocess().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::PostprocessingFault { ref stage, .. } if stage == "DisplayPostprocessor"
        ));
        assert_eq!(session.state(), SessionState::Errored);
    }

    #[test]
    fn test_postprocess_isolate() {
        let config = PipelineConfig {
            postprocessor_denylist: Vec::new(),
            postprocess_failure: PostprocessFailurePolicy::Isolate,
            ..PipelineConfig::default()
        };
        let mut session = session_with(runtime(), config);
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session.resolve_inputs(&[arg("threshold", 1)]).unwrap();
        session.run().unwrap();

        let failures = session.postprocess().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, "DisplayPostprocessor");
        assert_eq!(session.state(), SessionState::Postprocessed);
    }

    #[test]
    fn test_standin_choice_constructed() {
        let cmd = CommandDescriptor::new("filter.median", "Median")
            .with_parameter(ParameterDescriptor::input(
                "oob",
                StandinKind::OutOfBoundsFactory.foreign_type(),
            ));
        let rt = MemoryRuntime::scientific().with_command("filter.median", |ctx| {
            match ctx.value("oob") {
                Some(NativeValue::Choice(StandinChoice::Periodic)) => Ok(()),
                other => Err(ForeignError::new(format!("unexpected {:?}", other))),
            }
        });
        let mut session =
            Session::create(Arc::new(cmd), Arc::new(rt), Arc::new(PipelineConfig::default()))
                .unwrap();
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        session
            .resolve_inputs(&[arg("oob", StandinChoice::Periodic)])
            .unwrap();
        assert_eq!(
            session.instance().input("oob").unwrap().foreign_type().name(),
            "net.imglib2.outofbounds.OutOfBoundsPeriodicFactory"
        );
        session.run().unwrap();
    }

    #[test]
    fn test_standin_of_wrong_kind_rejected() {
        let cmd = CommandDescriptor::new("filter.median", "Median")
            .with_parameter(ParameterDescriptor::input(
                "oob",
                StandinKind::OutOfBoundsFactory.foreign_type(),
            ));
        let rt = MemoryRuntime::scientific().with_command("filter.median", |_| Ok(()));
        let mut session =
            Session::create(Arc::new(cmd), Arc::new(rt), Arc::new(PipelineConfig::default()))
                .unwrap();
        session.preprocess_to_harvester().unwrap();
        session.await_input().unwrap();
        let err = session
            .resolve_inputs(&[arg("oob", StandinChoice::FourConnected)])
            .unwrap_err();
        assert!(matches!(err, BridgeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_command_fails_instantiation() {
        let err = Session::create(
            Arc::new(CommandDescriptor::new("missing", "Missing")),
            Arc::new(MemoryRuntime::scientific()),
            Arc::new(PipelineConfig::default()),
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Instantiation { .. }));
        assert!(err.is_build_time());
    }
}
