//! Session phase state machine.
//!
//! Tracks the coarse lifecycle stage of a session and validates transitions.
//!
//! # State Diagram
//!
//! ```text
//! ┌─────────┐   start    ┌────────────┐   finish   ┌──────────┐
//! │  Lobby  │───────────▶│ InProgress │───────────▶│ Finished │
//! └─────────┘            └────────────┘            └──────────┘
//!   join                   roll                      (terminal)
//! ```
//!
//! Transitions are monotonic: there is no way back to an earlier phase.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Accepting players, game not started
    #[default]
    Lobby,
    /// Turns are being played
    InProgress,
    /// A winner was decided
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
        }
    }

    /// Check if the roster can still change.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Check if turn actions are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Check if the phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Calculate the phase reached by applying `event`.
    pub fn transition(&self, event: PhaseEvent) -> Result<Phase, InvalidTransition> {
        use Phase::*;
        use PhaseEvent::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: *self,
            event,
            reason,
        };

        match (self, event) {
            // Start: Lobby -> InProgress
            (Lobby, Start) => Ok(InProgress),
            (InProgress, Start) => Err(invalid("Game already in progress")),
            (Finished, Start) => Err(invalid("Game already finished")),

            // Finish: InProgress -> Finished
            (InProgress, Finish) => Ok(Finished),
            (Lobby, Finish) => Err(invalid("Game has not started")),
            (Finished, Finish) => Err(invalid("Game already finished")),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    Finish,
}

/// Error when a phase transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: Phase,
    pub event: PhaseEvent,
    pub reason: &'static str,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} via {:?}: {}",
            self.from, self.event, self.reason
        )
    }
}

impl std::error::Error for InvalidTransition {}
