//! Per-invocation execution pipeline.
//!
//! A [`Session`] drives one command instance through its lifecycle:
//!
//! 1. non-interactive preprocessing up to the input harvester
//! 2. computing which parameters the caller must supply
//! 3. binding the caller's values and finishing preprocessing
//! 4. initializing and running the command
//! 5. postprocessing, minus a denylist of stages that cannot run here
//! 6. classifying outputs and collecting in-place mutations
//!
//! Steps 1 and 2 happen when a command is wrapped; the resulting
//! [`GeneratedInvocable`] performs steps 3 to 6 when it is invoked.

mod classifier;
mod invocable;
mod mutation;
mod session;
mod state;

pub use classifier::{ClassifiedOutputs, DisplayableResult, NamedValue, OutputClassifier};
pub use invocable::{GeneratedInvocable, InvocationObserver, InvocationOutcome};
pub use mutation::MutationTracker;
pub use session::{Session, StageFailure};
pub use state::SessionState;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens when a postprocessing stage fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostprocessFailurePolicy {
    /// Abort the invocation with `PostprocessingFault`.
    #[default]
    FailFast,
    /// Record the failure, keep running the remaining stages and still
    /// extract outputs.
    Isolate,
}

impl FromStr for PostprocessFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "isolate" => Ok(Self::Isolate),
            other => Err(format!(
                "unknown postprocess failure policy '{}', expected fail_fast or isolate",
                other
            )),
        }
    }
}

impl fmt::Display for PostprocessFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FailFast => "fail_fast",
            Self::Isolate => "isolate",
        })
    }
}

/// Pipeline behaviour shared by every session of a bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Postprocessing stages that are skipped.
    #[serde(default = "default_postprocessor_denylist")]
    pub postprocessor_denylist: Vec<String>,

    /// Handling of postprocessing failures.
    #[serde(default)]
    pub postprocess_failure: PostprocessFailurePolicy,

    /// Default of the synthetic "show results in a new window" flag.
    #[serde(default)]
    pub display_results_in_new_window: bool,
}

fn default_postprocessor_denylist() -> Vec<String> {
    vec!["DisplayPostprocessor".to_string()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            postprocessor_denylist: default_postprocessor_denylist(),
            postprocess_failure: PostprocessFailurePolicy::default(),
            display_results_in_new_window: false,
        }
    }
}

impl PipelineConfig {
    /// Whether the stage named `stage` is skipped.
    pub fn is_denylisted(&self, stage: &str) -> bool {
        self.postprocessor_denylist.iter().any(|s| s == stage)
    }
}
