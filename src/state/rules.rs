//! Game rules that vary between sessions.
//!
//! Only turn rotation is fixed by observed behavior. Who may start, whether a
//! maximum roll grants another turn, and when the game is won are configured
//! here so sessions can opt in without changing the core state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, Roster};
use super::session::RollRecord;

/// How the turn advances after a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRule {
    /// Every roll passes the turn to the next player
    #[default]
    RotateEveryRoll,
    /// Rolling the highest face keeps the turn
    ExtraTurnOnMax,
}

/// Result of applying a `TurnRule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    pub next_index: usize,
    pub extra_turn: bool,
}

impl TurnRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RotateEveryRoll => "rotate_every_roll",
            Self::ExtraTurnOnMax => "extra_turn_on_max",
        }
    }

    /// Decide who moves next.
    ///
    /// `player_count` must be non-zero.
    pub fn advance(&self, current: usize, roll: u8, faces: u8, player_count: usize) -> TurnAdvance {
        let extra_turn = match self {
            Self::RotateEveryRoll => false,
            Self::ExtraTurnOnMax => roll == faces,
        };

        let next_index = if extra_turn {
            current
        } else {
            (current + 1) % player_count
        };

        TurnAdvance {
            next_index,
            extra_turn,
        }
    }
}

/// Who may start a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Any caller, joined or not
    #[default]
    Anyone,
    /// Any player on the roster
    Participant,
    /// Only the first player to join
    Host,
}

impl StartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anyone => "anyone",
            Self::Participant => "participant",
            Self::Host => "host",
        }
    }

    pub fn permits(&self, caller: &PlayerId, roster: &Roster) -> bool {
        match self {
            Self::Anyone => true,
            Self::Participant => roster.contains(caller),
            Self::Host => roster.first().as_ref() == Some(caller),
        }
    }
}

/// What a win condition sees after each roll.
#[derive(Debug, Clone, Copy)]
pub struct WinContext<'a> {
    /// Players in turn order
    pub players: &'a [PlayerId],
    /// Every roll so far, including `last`
    pub history: &'a [RollRecord],
    /// The roll just made
    pub last: &'a RollRecord,
}

/// Decides whether a roll ends the game.
///
/// Consulted after every successful roll. Returning `Some(player)` finishes
/// the session with that player as winner.
pub trait WinCondition: Send + Sync + fmt::Debug {
    fn winner(&self, ctx: &WinContext<'_>) -> Option<PlayerId>;
}

/// Win condition that never triggers; sessions stay in progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWinCondition;

impl WinCondition for NoWinCondition {
    fn winner(&self, _ctx: &WinContext<'_>) -> Option<PlayerId> {
        None
    }
}
