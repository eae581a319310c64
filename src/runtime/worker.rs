//! Off-thread invocation and result delivery.

use crate::error::{BridgeError, BridgeResult};
use crate::foreign::ForeignError;
use crate::pipeline::{DisplayableResult, GeneratedInvocable, InvocationOutcome, NamedValue};
use crate::types::{NativeValue, ResourceRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Where finished invocations are shown.
pub trait DisplaySink: Send + Sync {
    /// Add a natively displayable result to the host's view.
    fn add_displayable(&self, result: &DisplayableResult);

    /// Show generic results as a titled name/value list.
    fn show_results(&self, title: &str, results: &[NamedValue], external: bool);

    /// Redraw a resource the command wrote into.
    fn refresh(&self, resource: &ResourceRef);
}

/// Runs invocations on the blocking pool and hands their results to a
/// [`DisplaySink`].
#[derive(Clone)]
pub struct InvocationWorker {
    sink: Arc<dyn DisplaySink>,
}

impl InvocationWorker {
    /// A worker delivering into `sink`.
    pub fn new(sink: Arc<dyn DisplaySink>) -> Self {
        Self { sink }
    }

    /// Invoke with positional arguments and deliver the outcome.
    ///
    /// The outcome is also returned so callers can inspect stage failures.
    /// Nothing is delivered when the invocation fails.
    pub async fn submit(
        &self,
        invocable: GeneratedInvocable,
        arguments: Vec<Option<NativeValue>>,
    ) -> BridgeResult<InvocationOutcome> {
        let command = invocable.descriptor().identifier.clone();
        let outcome = tokio::task::spawn_blocking(move || invocable.invoke(arguments))
            .await
            .map_err(|e| {
                BridgeError::command_fault(
                    command.as_str(),
                    ForeignError::new(format!("invocation task aborted: {}", e)),
                )
            })??;
        self.deliver(&outcome);
        Ok(outcome)
    }

    /// Invoke with named arguments and deliver the outcome.
    pub async fn submit_named(
        &self,
        invocable: GeneratedInvocable,
        arguments: HashMap<String, NativeValue>,
    ) -> BridgeResult<InvocationOutcome> {
        let positional = invocable.bind_named(arguments)?;
        self.submit(invocable, positional).await
    }

    /// Hand a finished outcome to the sink.
    pub fn deliver(&self, outcome: &InvocationOutcome) {
        for result in &outcome.displayable {
            self.sink.add_displayable(result);
        }
        if !outcome.non_displayable.is_empty() {
            self.sink.show_results(
                &outcome.results_title(),
                &outcome.non_displayable,
                outcome.display_externally.unwrap_or(false),
            );
        }
        for resource in &outcome.refresh {
            self.sink.refresh(resource);
        }
        tracing::debug!(
            command = %outcome.command_title,
            displayable = outcome.displayable.len(),
            non_displayable = outcome.non_displayable.len(),
            refreshed = outcome.refresh.len(),
            "delivered results"
        );
    }
}

impl std::fmt::Debug for InvocationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationWorker").finish_non_exhaustive()
    }
}
