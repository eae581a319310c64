//! Pluggable strategies for matching a parameter against the registry.

use crate::catalog::{Direction, ParameterDescriptor};
use crate::conversion::registry::{priority, ConversionEntry, ConversionRegistry};
use crate::foreign::{ForeignType, TypeOracle};
use crate::types::{NativeType, StandinKind};

/// One strategy for resolving a parameter's native type.
///
/// The resolver consults checkers from highest to lowest priority and takes
/// the first answer.
pub trait TypeChecker: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    /// The native type this checker resolves `param` to, if any.
    fn check(
        &self,
        param: &ParameterDescriptor,
        registry: &ConversionRegistry,
        oracle: &dyn TypeOracle,
    ) -> Option<NativeType>;
}

/// Scan `registry` with a direction-sensitive relation.
///
/// `relation(from, to)` reads "a `from` can be used where a `to` is
/// expected". Inputs scan forward for an entry usable as the parameter;
/// outputs scan in reverse for an entry the produced value is usable as;
/// in-place parameters need both on the same entry.
pub fn scan_registry<F>(
    param: &ParameterDescriptor,
    registry: &ConversionRegistry,
    relation: F,
) -> Option<NativeType>
where
    F: Fn(&ForeignType, &ForeignType) -> bool,
{
    let target = &param.foreign_type;
    let hit: Option<&ConversionEntry> = match param.direction {
        Direction::InputOnly => registry
            .forward()
            .find(|e| relation(e.foreign_type(), target)),
        Direction::OutputOnly => registry
            .reverse()
            .find(|e| relation(target, e.foreign_type())),
        Direction::Both => registry
            .forward()
            .find(|e| relation(e.foreign_type(), target) && relation(target, e.foreign_type())),
    };
    hit.map(|e| e.native_type().clone())
}

/// Raw type equality.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactTypeChecker;

impl TypeChecker for ExactTypeChecker {
    fn name(&self) -> &str {
        "exact"
    }

    fn priority(&self) -> i32 {
        priority::VERY_HIGH
    }

    fn check(
        &self,
        param: &ParameterDescriptor,
        registry: &ConversionRegistry,
        oracle: &dyn TypeOracle,
    ) -> Option<NativeType> {
        scan_registry(param, registry, |from, to| oracle.same_type(from, to))
    }
}

/// Direct assignability through the foreign type hierarchy.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssignabilityChecker;

impl TypeChecker for AssignabilityChecker {
    fn name(&self) -> &str {
        "assignable"
    }

    fn priority(&self) -> i32 {
        priority::HIGH
    }

    fn check(
        &self,
        param: &ParameterDescriptor,
        registry: &ConversionRegistry,
        oracle: &dyn TypeOracle,
    ) -> Option<NativeType> {
        scan_registry(param, registry, |from, to| oracle.is_assignable(from, to))
    }
}

/// The closed standin table. Standins only ever flow into a command.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandinChecker;

impl TypeChecker for StandinChecker {
    fn name(&self) -> &str {
        "standin"
    }

    fn priority(&self) -> i32 {
        priority::NORMAL
    }

    fn check(
        &self,
        param: &ParameterDescriptor,
        _registry: &ConversionRegistry,
        _oracle: &dyn TypeOracle,
    ) -> Option<NativeType> {
        if param.direction != Direction::InputOnly {
            return None;
        }
        StandinKind::for_foreign_type(&param.foreign_type).map(NativeType::Standin)
    }
}

/// Anything the foreign runtime knows how to convert.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConversionChecker;

impl TypeChecker for ConversionChecker {
    fn name(&self) -> &str {
        "convertible"
    }

    fn priority(&self) -> i32 {
        priority::LOW
    }

    fn check(
        &self,
        param: &ParameterDescriptor,
        registry: &ConversionRegistry,
        oracle: &dyn TypeOracle,
    ) -> Option<NativeType> {
        scan_registry(param, registry, |from, to| oracle.supports_conversion(from, to))
    }
}
