//! In-process foreign runtime.
//!
//! [`MemoryRuntime`] implements [`ForeignRuntime`] over a declared type
//! hierarchy and a table of scripted commands. Foreign values produced by it
//! carry the original [`NativeValue`] as their payload, so host resources
//! keep their identity across a round trip through the runtime.
//!
//! # Example
//!
//! ```
//! use cmdbridge::foreign::memory::MemoryRuntime;
//! use cmdbridge::foreign::{ForeignRuntime, ForeignType, TypeOracle};
//! use cmdbridge::types::NativeValue;
//!
//! let runtime = MemoryRuntime::scientific();
//! let integer = ForeignType::new("java.lang.Integer");
//!
//! assert!(runtime.is_assignable(&integer, &ForeignType::new("java.lang.Number")));
//!
//! let foreign = runtime.to_foreign(&NativeValue::Int(5), &integer).unwrap();
//! assert_eq!(runtime.to_native(&foreign), NativeValue::Int(5));
//! ```

use crate::catalog::CommandDescriptor;
use crate::foreign::{
    CommandInstance, ForeignError, ForeignObject, ForeignRuntime, ForeignType, ModuleStage,
    TypeOracle,
};
use crate::types::{NativeValue, StandinChoice};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Root of the foreign type hierarchy; every type is assignable to it.
pub const OBJECT_TYPE: &str = "java.lang.Object";

/// Type of the application context injected by [`MemoryRuntime::scientific`].
pub const CONTEXT_TYPE: &str = "org.scijava.Context";

/// Body of a scripted command.
pub type CommandBody =
    Arc<dyn Fn(&mut CommandContext<'_>) -> Result<(), ForeignError> + Send + Sync>;

type StageBody = Arc<dyn Fn(&mut dyn CommandInstance) -> Result<(), ForeignError> + Send + Sync>;

/// A module stage defined by a closure.
#[derive(Clone)]
pub struct FnStage {
    name: String,
    harvester: bool,
    body: StageBody,
}

impl FnStage {
    /// A non-interactive stage.
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&mut dyn CommandInstance) -> Result<(), ForeignError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            harvester: false,
            body: Arc::new(body),
        }
    }

    /// The interactive input harvester. Only reached for inputs the bridge
    /// did not resolve, so it resolves nothing itself.
    pub fn harvester(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            harvester: true,
            body: Arc::new(resolve_nothing),
        }
    }
}

impl fmt::Debug for FnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .field("harvester", &self.harvester)
            .finish()
    }
}

impl ModuleStage for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_harvester(&self) -> bool {
        self.harvester
    }

    fn process(&self, instance: &mut dyn CommandInstance) -> Result<(), ForeignError> {
        (self.body)(instance)
    }
}

/// What a scripted command body sees while it runs.
pub struct CommandContext<'a> {
    descriptor: &'a CommandDescriptor,
    inputs: &'a HashMap<String, ForeignObject>,
    produced: &'a mut HashMap<String, ForeignObject>,
}

impl<'a> CommandContext<'a> {
    /// The running command's descriptor.
    pub fn descriptor(&self) -> &CommandDescriptor {
        self.descriptor
    }

    /// A bound input as a foreign object.
    pub fn input(&self, name: &str) -> Option<&ForeignObject> {
        self.inputs.get(name)
    }

    /// A bound input as the host value it was converted from.
    pub fn value(&self, name: &str) -> Option<&NativeValue> {
        self.inputs.get(name).and_then(|obj| obj.downcast_ref::<NativeValue>())
    }

    /// Numeric input, widening integers.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(NativeValue::as_f64)
    }

    /// Boolean input.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(NativeValue::as_bool)
    }

    /// Produce an output.
    pub fn set_output(&mut self, name: &str, value: ForeignObject) {
        self.produced.insert(name.to_string(), value);
    }

    /// Produce an output from a host value, typed as the declared parameter.
    pub fn set_value(&mut self, name: &str, value: NativeValue) -> Result<(), ForeignError> {
        let param = self
            .descriptor
            .outputs()
            .find(|p| p.name == name)
            .ok_or_else(|| ForeignError::new(format!("no output named '{}'", name)))?;
        let obj = ForeignObject::new(param.foreign_type.clone(), value);
        self.produced.insert(name.to_string(), obj);
        Ok(())
    }
}

/// A command instance that runs a closure over its bound inputs.
///
/// Outputs not set by the closure fall back to the bound input for
/// parameters declared in both directions, so an in-place command returns
/// the very object it was given.
pub struct ScriptedCommand {
    descriptor: CommandDescriptor,
    inputs: HashMap<String, ForeignObject>,
    resolved: HashSet<String>,
    produced: HashMap<String, ForeignObject>,
    initialized: bool,
    body: CommandBody,
}

impl ScriptedCommand {
    /// Create an instance of `descriptor` running `body`.
    pub fn new(descriptor: CommandDescriptor, body: CommandBody) -> Self {
        Self {
            descriptor,
            inputs: HashMap::new(),
            resolved: HashSet::new(),
            produced: HashMap::new(),
            initialized: false,
            body,
        }
    }
}

impl CommandInstance for ScriptedCommand {
    fn descriptor(&self) -> &CommandDescriptor {
        &self.descriptor
    }

    fn set_input(&mut self, name: &str, value: ForeignObject) {
        self.inputs.insert(name.to_string(), value);
    }

    fn input(&self, name: &str) -> Option<ForeignObject> {
        self.inputs.get(name).cloned()
    }

    fn resolve_input(&mut self, name: &str) {
        self.resolved.insert(name.to_string());
    }

    fn is_input_resolved(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    fn initialize(&mut self) -> Result<(), ForeignError> {
        self.initialized = true;
        Ok(())
    }

    fn run(&mut self) -> Result<(), ForeignError> {
        if !self.initialized {
            return Err(ForeignError::new(format!(
                "{} was run before being initialized",
                self.descriptor.identifier
            )));
        }
        let mut ctx = CommandContext {
            descriptor: &self.descriptor,
            inputs: &self.inputs,
            produced: &mut self.produced,
        };
        (self.body)(&mut ctx)
    }

    fn outputs(&self) -> Vec<(String, Option<ForeignObject>)> {
        self.descriptor
            .outputs()
            .map(|p| {
                let value = self.produced.get(&p.name).cloned().or_else(|| {
                    p.direction
                        .is_input()
                        .then(|| self.inputs.get(&p.name).cloned())
                        .flatten()
                });
                (p.name.clone(), value)
            })
            .collect()
    }

    fn dispose(&mut self) {
        self.inputs.clear();
        self.produced.clear();
    }
}

/// An in-process [`ForeignRuntime`].
#[derive(Clone)]
pub struct MemoryRuntime {
    supertypes: HashMap<ForeignType, Vec<ForeignType>>,
    conversions: HashSet<(ForeignType, ForeignType)>,
    value_types: HashMap<&'static str, ForeignType>,
    commands: HashMap<String, CommandBody>,
    preprocessors: Vec<FnStage>,
    postprocessors: Vec<FnStage>,
}

impl MemoryRuntime {
    /// A runtime with no type hierarchy, commands or stages.
    ///
    /// Host values are typed with their conventional foreign counterparts
    /// (`bool` as `java.lang.Boolean`, `int` as `java.lang.Long`, ...).
    pub fn new() -> Self {
        let value_types = [
            ("bool", "java.lang.Boolean"),
            ("int", "java.lang.Long"),
            ("float", "java.lang.Double"),
            ("str", "java.lang.String"),
            ("path", "java.io.File"),
            ("list", "java.util.List"),
            ("array", "net.imglib2.img.Img"),
            ("image", "net.imagej.Dataset"),
            ("labels", "net.imglib2.roi.labeling.ImgLabeling"),
            ("points", "net.imglib2.roi.geom.real.PointMask"),
            ("shapes", "net.imglib2.roi.geom.real.Polygon2D"),
            ("surface", "net.imagej.mesh.Mesh"),
            ("tracks", "fiji.plugin.trackmate.Model"),
        ]
        .into_iter()
        .map(|(kind, ty)| (kind, ForeignType::new(ty)))
        .collect();

        Self {
            supertypes: HashMap::new(),
            conversions: HashSet::new(),
            value_types,
            commands: HashMap::new(),
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
        }
    }

    /// A runtime modelled on a scientific imaging stack: boxed numeric
    /// types, strings, files, the image hierarchy and the standin
    /// interfaces, with an input harvester, a context injector and a
    /// display postprocessor that cannot run headless.
    pub fn scientific() -> Self {
        let numeric = [
            "byte",
            "short",
            "int",
            "long",
            "float",
            "double",
            "java.lang.Byte",
            "java.lang.Short",
            "java.lang.Integer",
            "java.lang.Long",
            "java.lang.Float",
            "java.lang.Double",
            "java.math.BigInteger",
            "java.math.BigDecimal",
        ];

        let mut runtime = Self::new();
        for ty in &numeric[6..] {
            runtime = runtime.with_supertype(*ty, "java.lang.Number");
        }
        for from in numeric {
            for to in numeric {
                if from != to {
                    runtime = runtime.with_conversion(from, to);
                }
            }
        }

        runtime
            .with_conversion("java.lang.Boolean", "boolean")
            .with_conversion("boolean", "java.lang.Boolean")
            .with_supertype("java.lang.String", "java.lang.CharSequence")
            .with_conversion("java.lang.String", "java.lang.Character")
            .with_conversion("java.lang.String", "char")
            .with_conversion("java.io.File", "java.nio.file.Path")
            .with_conversion("java.nio.file.Path", "java.io.File")
            .with_supertype("java.util.List", "java.util.Collection")
            .with_supertype("net.imagej.Dataset", "net.imglib2.img.Img")
            .with_supertype("net.imagej.ImgPlus", "net.imglib2.img.Img")
            .with_supertype("net.imglib2.img.Img", "net.imglib2.RandomAccessibleInterval")
            .with_supertype("net.imglib2.img.Img", "net.imglib2.IterableInterval")
            .with_supertype("net.imglib2.RandomAccessibleInterval", "net.imglib2.RandomAccessible")
            .with_supertype("net.imglib2.RandomAccessibleInterval", "net.imglib2.Interval")
            .with_supertype(
                "net.imglib2.roi.labeling.ImgLabeling",
                "net.imglib2.RandomAccessibleInterval",
            )
            .with_conversion("net.imglib2.img.Img", "net.imagej.Dataset")
            .with_conversion("net.imagej.Dataset", "net.imagej.display.ImageDisplay")
            .with_standin_supertypes()
            .with_preprocessor(FnStage::new("ServiceInjector", inject_context))
            .with_preprocessor(FnStage::harvester("InputHarvester"))
            .with_postprocessor(FnStage::new("DisplayPostprocessor", |_| {
                Err(ForeignError::new("no display service in a headless runtime"))
            }))
    }

    fn with_standin_supertypes(mut self) -> Self {
        for kind in crate::types::StandinKind::ALL {
            for choice in kind.choices() {
                self = self.with_supertype(choice.foreign_class(), kind.foreign_type());
            }
        }
        self
    }

    /// Declare `parent` as a direct supertype of `child`.
    pub fn with_supertype(
        mut self,
        child: impl Into<ForeignType>,
        parent: impl Into<ForeignType>,
    ) -> Self {
        self.supertypes
            .entry(child.into())
            .or_default()
            .push(parent.into());
        self
    }

    /// Register a one-way conversion.
    pub fn with_conversion(mut self, from: impl Into<ForeignType>, to: impl Into<ForeignType>) -> Self {
        self.conversions.insert((from.into(), to.into()));
        self
    }

    /// Override the foreign type host values of `kind` are given, where
    /// `kind` is a [`NativeValue::kind_name`].
    pub fn with_value_type(mut self, kind: &'static str, ty: impl Into<ForeignType>) -> Self {
        self.value_types.insert(kind, ty.into());
        self
    }

    /// Register a scripted command under `identifier`.
    pub fn with_command(
        mut self,
        identifier: impl Into<String>,
        body: impl Fn(&mut CommandContext<'_>) -> Result<(), ForeignError> + Send + Sync + 'static,
    ) -> Self {
        self.commands.insert(identifier.into(), Arc::new(body));
        self
    }

    /// Append a preprocessing stage.
    pub fn with_preprocessor(mut self, stage: FnStage) -> Self {
        self.preprocessors.push(stage);
        self
    }

    /// Append a postprocessing stage.
    pub fn with_postprocessor(mut self, stage: FnStage) -> Self {
        self.postprocessors.push(stage);
        self
    }

    /// The foreign type a host value naturally has in this runtime.
    pub fn natural_type(&self, value: &NativeValue) -> Option<ForeignType> {
        match value {
            NativeValue::None => None,
            NativeValue::Choice(choice) => Some(choice.foreign_class()),
            NativeValue::Foreign(obj) => Some(obj.foreign_type().clone()),
            other => self.value_types.get(other.kind_name()).cloned(),
        }
    }
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<_> = self.commands.keys().collect();
        commands.sort();
        f.debug_struct("MemoryRuntime")
            .field("types", &self.supertypes.len())
            .field("conversions", &self.conversions.len())
            .field("commands", &commands)
            .field("preprocessors", &self.preprocessors)
            .field("postprocessors", &self.postprocessors)
            .finish()
    }
}

fn resolve_nothing(_: &mut dyn CommandInstance) -> Result<(), ForeignError> {
    Ok(())
}

fn inject_context(instance: &mut dyn CommandInstance) -> Result<(), ForeignError> {
    let names: Vec<String> = instance
        .descriptor()
        .inputs()
        .filter(|p| p.foreign_type.name() == CONTEXT_TYPE)
        .map(|p| p.name.clone())
        .collect();
    for name in names {
        instance.set_input(&name, ForeignObject::new(ForeignType::new(CONTEXT_TYPE), ()));
        instance.resolve_input(&name);
    }
    Ok(())
}

impl TypeOracle for MemoryRuntime {
    fn is_assignable(&self, from: &ForeignType, to: &ForeignType) -> bool {
        if from == to || to.name() == OBJECT_TYPE {
            return true;
        }
        let mut pending = vec![from];
        let mut seen = HashSet::new();
        while let Some(ty) = pending.pop() {
            for parent in self.supertypes.get(ty).into_iter().flatten() {
                if parent == to {
                    return true;
                }
                if seen.insert(parent) {
                    pending.push(parent);
                }
            }
        }
        false
    }

    fn supports_conversion(&self, from: &ForeignType, to: &ForeignType) -> bool {
        self.is_assignable(from, to) || self.conversions.contains(&(from.clone(), to.clone()))
    }
}

impl ForeignRuntime for MemoryRuntime {
    fn to_foreign(&self, value: &NativeValue, target: &ForeignType) -> Option<ForeignObject> {
        match value {
            NativeValue::None => None,
            NativeValue::Foreign(obj) => self
                .supports_conversion(obj.foreign_type(), target)
                .then(|| obj.retyped(target.clone())),
            other => {
                let natural = self.natural_type(other)?;
                self.supports_conversion(&natural, target)
                    .then(|| ForeignObject::new(target.clone(), other.clone()))
            }
        }
    }

    fn to_native(&self, value: &ForeignObject) -> NativeValue {
        value
            .downcast_ref::<NativeValue>()
            .cloned()
            .unwrap_or_else(|| NativeValue::Foreign(value.clone()))
    }

    fn construct(&self, class: &ForeignType) -> Result<ForeignObject, ForeignError> {
        StandinChoice::from_foreign_class(class)
            .map(|choice| ForeignObject::new(class.clone(), NativeValue::Choice(choice)))
            .ok_or_else(|| ForeignError::new(format!("{} has no zero-arg constructor", class)))
    }

    fn instantiate(
        &self,
        descriptor: &CommandDescriptor,
    ) -> Result<Box<dyn CommandInstance>, ForeignError> {
        let body = self.commands.get(&descriptor.identifier).ok_or_else(|| {
            ForeignError::new(format!("no command registered as {}", descriptor.identifier))
        })?;
        Ok(Box::new(ScriptedCommand::new(
            descriptor.clone(),
            Arc::clone(body),
        )))
    }

    fn preprocessors(&self) -> Vec<Box<dyn ModuleStage>> {
        self.preprocessors
            .iter()
            .cloned()
            .map(|stage| Box::new(stage) as Box<dyn ModuleStage>)
            .collect()
    }

    fn postprocessors(&self) -> Vec<Box<dyn ModuleStage>> {
        self.postprocessors
            .iter()
            .cloned()
            .map(|stage| Box::new(stage) as Box<dyn ModuleStage>)
            .collect()
    }
}
