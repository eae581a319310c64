//! The callable produced by wrapping a command.

use crate::catalog::CommandDescriptor;
use crate::error::{BridgeError, BridgeResult};
use crate::pipeline::{
    DisplayableResult, MutationTracker, NamedValue, OutputClassifier, Session, SessionState,
    StageFailure,
};
use crate::signature::{Signature, EXTERNAL_DISPLAY_PARAMETER};
use crate::types::{NativeValue, ResourceRef};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Everything an invocation hands back to its caller.
#[derive(Clone, Debug, Default)]
pub struct InvocationOutcome {
    /// Title of the command that ran.
    pub command_title: String,
    /// Results the host displays natively, in declaration order.
    pub displayable: Vec<DisplayableResult>,
    /// Results shown as name/value pairs, in declaration order.
    pub non_displayable: Vec<NamedValue>,
    /// Supplied resources the command wrote into.
    pub refresh: Vec<ResourceRef>,
    /// The caller's choice of external display, when the signature offered one.
    pub display_externally: Option<bool>,
    /// Postprocessing failures recorded instead of aborting.
    pub stage_failures: Vec<StageFailure>,
}

impl InvocationOutcome {
    /// Title for a window listing the non-displayable results.
    pub fn results_title(&self) -> String {
        format!("Result: {}", self.command_title)
    }

    /// True when there is nothing to display or refresh.
    pub fn is_empty(&self) -> bool {
        self.displayable.is_empty() && self.non_displayable.is_empty() && self.refresh.is_empty()
    }
}

/// Hooks called around each invocation.
pub trait InvocationObserver: Send + Sync {
    /// The caller's arguments were bound, before anything ran.
    fn invocation_started(
        &self,
        _signature: &Signature,
        _arguments: &[(String, Option<NativeValue>)],
    ) {
    }

    /// The invocation reached `Done`.
    fn invocation_finished(&self, _signature: &Signature, _outcome: &InvocationOutcome) {}

    /// The invocation failed.
    fn invocation_failed(&self, _signature: &Signature, _error: &BridgeError) {}
}

/// A wrapped command, ready to be invoked once.
///
/// Holds the signature the caller binds against and the session that was
/// preprocessed up to the input harvester. Invoking consumes it; dropping
/// it without invoking abandons the session.
pub struct GeneratedInvocable {
    descriptor: Arc<CommandDescriptor>,
    signature: Signature,
    session: Session,
    observer: Option<Arc<dyn InvocationObserver>>,
}

impl GeneratedInvocable {
    pub(crate) fn new(
        session: Session,
        signature: Signature,
        observer: Option<Arc<dyn InvocationObserver>>,
    ) -> Self {
        Self {
            descriptor: Arc::clone(session.descriptor()),
            signature,
            session,
            observer,
        }
    }

    /// Invocable name.
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// The signature arguments are bound against.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The wrapped command.
    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    /// Id of the underlying session.
    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    /// State of the underlying session.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Turn named arguments into positional ones, filling declared
    /// defaults.
    pub fn bind_named(
        &self,
        mut arguments: HashMap<String, NativeValue>,
    ) -> BridgeResult<Vec<Option<NativeValue>>> {
        let bound = self
            .signature
            .parameters()
            .iter()
            .map(|p| arguments.remove(&p.name).or_else(|| p.default.clone()))
            .collect();

        match arguments.keys().min() {
            Some(unknown) => Err(BridgeError::unknown_argument(self.name(), unknown)),
            None => Ok(bound),
        }
    }

    /// Invoke with named arguments.
    pub fn invoke_named(
        self,
        arguments: HashMap<String, NativeValue>,
    ) -> BridgeResult<InvocationOutcome> {
        let positional = self.bind_named(arguments)?;
        self.invoke(positional)
    }

    /// Invoke with positional arguments in signature order.
    ///
    /// Missing trailing arguments, `None` and [`NativeValue::None`] all
    /// take the parameter's default.
    pub fn invoke(mut self, arguments: Vec<Option<NativeValue>>) -> BridgeResult<InvocationOutcome> {
        let params = self.signature.parameters();
        if arguments.len() > params.len() {
            return Err(BridgeError::unknown_argument(
                self.name(),
                format!("#{}", params.len()),
            ));
        }

        let mut positional = arguments.into_iter();
        let mut bound = Vec::with_capacity(params.len());
        let mut display_externally = None;
        for spec in params {
            let value = positional
                .next()
                .flatten()
                .filter(|v| !v.is_none())
                .or_else(|| spec.default.clone());
            if spec.synthetic {
                if spec.name == EXTERNAL_DISPLAY_PARAMETER {
                    display_externally = value.as_ref().and_then(NativeValue::as_bool);
                }
                continue;
            }
            bound.push((spec.name.clone(), value));
        }

        tracing::info!(
            command = %self.descriptor.identifier,
            session = %self.session.id(),
            arguments = bound.len(),
            "invoking command"
        );
        if let Some(observer) = &self.observer {
            observer.invocation_started(&self.signature, &bound);
        }

        let result = self.drive(bound, display_externally);

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    command = %self.descriptor.identifier,
                    displayable = outcome.displayable.len(),
                    non_displayable = outcome.non_displayable.len(),
                    refresh = outcome.refresh.len(),
                    "invocation finished"
                );
                if let Some(observer) = &self.observer {
                    observer.invocation_finished(&self.signature, outcome);
                }
            }
            Err(error) => {
                if let Some(observer) = &self.observer {
                    observer.invocation_failed(&self.signature, error);
                }
            }
        }
        result
    }

    fn drive(
        &mut self,
        arguments: Vec<(String, Option<NativeValue>)>,
        display_externally: Option<bool>,
    ) -> BridgeResult<InvocationOutcome> {
        self.session.resolve_inputs(&arguments)?;
        self.session.run()?;
        let stage_failures = self.session.postprocess()?;

        let returned_inputs = self.session.returned_inputs();
        let outputs: Vec<(String, NativeValue)> = self
            .session
            .outputs()
            .into_iter()
            .filter(|(name, _)| !returned_inputs.contains(name))
            .collect();
        let supplied: Vec<(String, NativeValue)> = arguments
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();
        let classified = OutputClassifier.classify(&outputs, &supplied);
        let refresh = MutationTracker.refresh_targets(&self.descriptor.parameters, &supplied);
        self.session.finish()?;

        Ok(InvocationOutcome {
            command_title: self.descriptor.title.clone(),
            displayable: classified.displayable,
            non_displayable: classified.non_displayable,
            refresh,
            display_externally,
            stage_failures,
        })
    }

    /// Abandon the invocation before it runs.
    pub fn dismiss(self) {
        tracing::debug!(
            command = %self.descriptor.identifier,
            session = %self.session.id(),
            cancellable = self.session.state().is_cancellable(),
            "invocation dismissed"
        );
    }
}

impl fmt::Debug for GeneratedInvocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedInvocable")
            .field("name", &self.signature.name())
            .field("signature", &self.signature.to_string())
            .field("session", &self.session)
            .finish()
    }
}
