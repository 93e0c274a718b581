//! State management module for Ludo sessions.
//!
//! This module provides the core state types:
//!
//! - `player` - Caller identity and the ordered roster
//! - `phase` - Session phase state machine
//! - `dice` - Die sources
//! - `rules` - Turn advance, start policy and win conditions
//! - `config` - Per-session settings
//! - `session` - One game's lifecycle
//! - `registry` - Many isolated sessions
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          SessionRegistry                             │
//! │                                                                      │
//! │   session_id → Arc<Mutex<GameSession>>   (one lock per session)      │
//! │                                                                      │
//! │  ┌────────────────────────────────────────────────────────────────┐  │
//! │  │                         GameSession                             │  │
//! │  │                                                                 │  │
//! │  │  Roster [p0, p1, ..]   current_turn_index   round   history     │  │
//! │  │                                                                 │  │
//! │  │   Lobby ──start──▶ InProgress ──win──▶ Finished                 │  │
//! │  │   join              roll                (queries only)          │  │
//! │  │                                                                 │  │
//! │  │  Dice (RandomDice / ScriptedDice)   TurnRule   WinCondition     │  │
//! │  └────────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use ludo_state::state::{PlayerId, SessionConfig, SessionRegistry};
//!
//! let registry = SessionRegistry::new();
//! let id = registry.create(SessionConfig::default()).unwrap();
//!
//! registry.join_game(&id, PlayerId::from_low_u64(1)).unwrap();
//! registry.join_game(&id, PlayerId::from_low_u64(2)).unwrap();
//! registry.start_game(&id, PlayerId::from_low_u64(1)).unwrap();
//!
//! assert!(registry.game_state(&id).unwrap().is_game_in_progress);
//! ```

pub mod config;
pub mod dice;
pub mod phase;
pub mod player;
pub mod registry;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, SessionConfig, MAX_PLAYERS, MIN_PLAYERS};
pub use dice::{Dice, RandomDice, ScriptedDice, DEFAULT_DIE_FACES};
pub use phase::{InvalidTransition, Phase, PhaseEvent};
pub use player::{ParsePlayerIdError, PlayerId, Roster, RosterError, PLAYER_ID_LEN};
pub use registry::{RegistryError, SessionId, SessionRegistry, SharedSession};
pub use rules::{NoWinCondition, StartPolicy, TurnAdvance, TurnRule, WinCondition, WinContext};
pub use session::{GameError, GameSession, GameState, RollOutcome, RollRecord};
