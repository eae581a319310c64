//! Tracking of host resources a command wrote into.

use crate::catalog::ParameterDescriptor;
use crate::types::{NativeValue, ResourceRef};

/// Finds the supplied host resources a command may have mutated in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct MutationTracker;

impl MutationTracker {
    /// Resources supplied for parameters that are also outputs, in
    /// declaration order. The caller must refresh these after the run.
    pub fn refresh_targets(
        &self,
        params: &[ParameterDescriptor],
        supplied: &[(String, NativeValue)],
    ) -> Vec<ResourceRef> {
        params
            .iter()
            .filter(|p| p.direction.is_output())
            .filter_map(|p| {
                supplied.iter().find_map(|(name, value)| match value {
                    NativeValue::Resource(resource) if *name == p.name => Some(resource.clone()),
                    _ => None,
                })
            })
            .collect()
    }
}
