//! Ludo State Library
//!
//! This crate provides the session state machine for a turn-based Ludo game.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Game Sessions** - Roster management, phase transitions
//!   (Lobby → InProgress → Finished) and per-turn validation.
//!
//! - **Phase State Machine** - Monotonic transitions with validated events.
//!
//! - **Dice and Rules** - Pluggable dice, turn-advance rules, start policies and
//!   win conditions.
//!
//! - **Session Registry** - Many isolated sessions, each serialized behind its own lock.
//!
//! # Design Principles
//!
//! 1. **Caller identity is explicit** - Every operation takes the calling `PlayerId`.
//!
//! 2. **Failures are atomic** - A rejected call leaves the session exactly as it was.
//!
//! 3. **No networking** - This crate is pure state, no transport or persistence.
//!
//! 4. **Serialization-ready** - Snapshots and configuration are serde types.
//!
//! # Example
//!
//! ```rust
//! use ludo_state::state::{GameError, GameSession, PlayerId, SessionConfig};
//!
//! let alice = PlayerId::from_low_u64(1);
//! let bob = PlayerId::from_low_u64(2);
//!
//! let mut session = GameSession::new(SessionConfig::default());
//! session.join_game(alice).unwrap();
//! session.join_game(bob).unwrap();
//! session.start_game(alice).unwrap();
//!
//! assert!(session.get_game_state().is_game_in_progress);
//! assert_eq!(session.roll_dice(bob).unwrap_err(), GameError::NotYourTurn);
//!
//! let outcome = session.roll_dice(alice).unwrap();
//! assert!((1..=6).contains(&outcome.value));
//! assert_eq!(session.get_game_state().current_turn_index, 1);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
