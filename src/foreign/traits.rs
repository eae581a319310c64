//! Seams the foreign runtime collaborator implements.

use crate::catalog::CommandDescriptor;
use crate::foreign::{ForeignError, ForeignObject, ForeignType};
use crate::types::NativeValue;

/// Type-system queries answered by the foreign runtime.
///
/// Every relation reads "a value of `from` can be used where `to` is
/// expected".
pub trait TypeOracle: Send + Sync {
    /// Raw type equality.
    fn same_type(&self, a: &ForeignType, b: &ForeignType) -> bool {
        a == b
    }

    /// `to` is `from` or one of its supertypes.
    fn is_assignable(&self, from: &ForeignType, to: &ForeignType) -> bool;

    /// A conversion from `from` to `to` is registered in the runtime.
    fn supports_conversion(&self, from: &ForeignType, to: &ForeignType) -> bool;
}

/// A ready handle to the foreign command runtime.
///
/// Bootstrapping the runtime is the host's business; the bridge only ever
/// sees a handle that is already usable.
pub trait ForeignRuntime: TypeOracle {
    /// Convert a host value into a foreign value of type `target`.
    ///
    /// Returns `None` when no conversion path exists.
    fn to_foreign(&self, value: &NativeValue, target: &ForeignType) -> Option<ForeignObject>;

    /// Convert a foreign value into its host counterpart, falling back to
    /// [`NativeValue::Foreign`] when there is none.
    fn to_native(&self, value: &ForeignObject) -> NativeValue;

    /// Construct `class` with its zero-arg constructor.
    fn construct(&self, class: &ForeignType) -> Result<ForeignObject, ForeignError>;

    /// Create a fresh command instance for `descriptor`.
    fn instantiate(
        &self,
        descriptor: &CommandDescriptor,
    ) -> Result<Box<dyn CommandInstance>, ForeignError>;

    /// Preprocessing stages, in priority order.
    fn preprocessors(&self) -> Vec<Box<dyn ModuleStage>>;

    /// Postprocessing stages, in priority order.
    fn postprocessors(&self) -> Vec<Box<dyn ModuleStage>>;
}

/// A mutable, single-use instance of a foreign command.
pub trait CommandInstance: Send {
    /// The descriptor this instance was created from.
    fn descriptor(&self) -> &CommandDescriptor;

    /// Bind an input value.
    fn set_input(&mut self, name: &str, value: ForeignObject);

    /// The value currently bound to an input.
    fn input(&self, name: &str) -> Option<ForeignObject>;

    /// Mark an input as resolved, with or without a bound value.
    fn resolve_input(&mut self, name: &str);

    /// Whether an input has been resolved.
    fn is_input_resolved(&self, name: &str) -> bool;

    /// Prepare the command to run.
    fn initialize(&mut self) -> Result<(), ForeignError>;

    /// Execute the command.
    fn run(&mut self) -> Result<(), ForeignError>;

    /// Output values in declaration order; `None` where nothing was produced.
    fn outputs(&self) -> Vec<(String, Option<ForeignObject>)>;

    /// Release foreign resources. Called once when the session ends.
    fn dispose(&mut self) {}
}

/// A pre- or postprocessing stage of the foreign runtime's module pipeline.
pub trait ModuleStage: Send {
    /// Stage name, matched against the postprocessing denylist.
    fn name(&self) -> &str;

    /// The interactive input harvester. Preprocessing stops before it.
    fn is_harvester(&self) -> bool {
        false
    }

    /// Apply the stage to a command instance.
    fn process(&self, instance: &mut dyn CommandInstance) -> Result<(), ForeignError>;
}
