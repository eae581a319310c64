//! Session lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a [`Session`](crate::pipeline::Session) is in its lifecycle.
///
/// Sessions move strictly forward, one state at a time, and may drop into
/// [`Errored`](SessionState::Errored) from any state that is not terminal.
///
/// ```text
/// Created → PreprocessedToHarvest → AwaitingUserInput → InputsResolved
///         → Initialized → Ran → Postprocessed → Done
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Instance created, nothing run yet.
    Created,
    /// Non-interactive preprocessing ran up to the harvester.
    PreprocessedToHarvest,
    /// Signature built, waiting for caller arguments.
    AwaitingUserInput,
    /// Every input bound or explicitly skipped.
    InputsResolved,
    /// Command initialized.
    Initialized,
    /// Command executed.
    Ran,
    /// Postprocessing stages applied.
    Postprocessed,
    /// Outputs extracted.
    Done,
    /// The session failed.
    Errored,
}

impl SessionState {
    const ORDER: [SessionState; 8] = [
        Self::Created,
        Self::PreprocessedToHarvest,
        Self::AwaitingUserInput,
        Self::InputsResolved,
        Self::Initialized,
        Self::Ran,
        Self::Postprocessed,
        Self::Done,
    ];

    fn ordinal(self) -> Option<usize> {
        Self::ORDER.iter().position(|s| *s == self)
    }

    /// `Done` or `Errored`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Errored)
    }

    /// The state that follows on success, if any.
    pub fn next(self) -> Option<SessionState> {
        self.ordinal().and_then(|i| Self::ORDER.get(i + 1).copied())
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_transition_to(self, to: SessionState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Errored || self.next() == Some(to)
    }

    /// Whether the command may still be abandoned without side effects.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            Self::Created | Self::PreprocessedToHarvest | Self::AwaitingUserInput | Self::InputsResolved
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::PreprocessedToHarvest => "preprocessed_to_harvest",
            Self::AwaitingUserInput => "awaiting_user_input",
            Self::InputsResolved => "inputs_resolved",
            Self::Initialized => "initialized",
            Self::Ran => "ran",
            Self::Postprocessed => "postprocessed",
            Self::Done => "done",
            Self::Errored => "errored",
        };
        f.write_str(name)
    }
}
