//! Session configuration.
//!
//! All fields have defaults, so a partial JSON document only overrides what
//! it names:
//!
//! ```rust
//! use ludo_state::state::{SessionConfig, StartPolicy};
//!
//! let config = SessionConfig::from_json_str(r#"{ "start_policy": "host" }"#).unwrap();
//! assert_eq!(config.start_policy, StartPolicy::Host);
//! assert_eq!(config.max_players, 4);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dice::DEFAULT_DIE_FACES;
use super::rules::{StartPolicy, TurnRule};

/// Maximum players per session.
pub const MAX_PLAYERS: usize = 4;

/// Minimum players needed to start.
pub const MIN_PLAYERS: usize = 2;

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Roster capacity
    pub max_players: usize,

    /// Players required before the game can start
    pub min_players: usize,

    /// Faces on the die
    pub die_faces: u8,

    /// Who may start the game
    pub start_policy: StartPolicy,

    /// How the turn advances after a roll
    pub turn_rule: TurnRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            min_players: MIN_PLAYERS,
            die_faces: DEFAULT_DIE_FACES,
            start_policy: StartPolicy::default(),
            turn_rule: TurnRule::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < MIN_PLAYERS {
            return Err(ConfigError::MinPlayersTooLow(self.min_players));
        }

        if self.max_players > MAX_PLAYERS {
            return Err(ConfigError::CapacityAboveMaximum(self.max_players));
        }

        if self.max_players < self.min_players {
            return Err(ConfigError::CapacityBelowMinimum {
                max_players: self.max_players,
                min_players: self.min_players,
            });
        }

        if self.die_faces < 2 {
            return Err(ConfigError::TooFewFaces(self.die_faces));
        }

        Ok(())
    }

    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    pub fn with_turn_rule(mut self, rule: TurnRule) -> Self {
        self.turn_rule = rule;
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "max_players": self.max_players,
            "min_players": self.min_players,
            "die_faces": self.die_faces,
            "start_policy": self.start_policy.as_str(),
            "turn_rule": self.turn_rule.as_str()
        })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    MinPlayersTooLow(usize),
    CapacityAboveMaximum(usize),
    CapacityBelowMinimum {
        max_players: usize,
        min_players: usize,
    },
    TooFewFaces(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Invalid session config: {}", e),
            Self::MinPlayersTooLow(n) => {
                write!(f, "min_players must be at least {}, got {}", MIN_PLAYERS, n)
            }
            Self::CapacityAboveMaximum(n) => {
                write!(f, "max_players must be at most {}, got {}", MAX_PLAYERS, n)
            }
            Self::CapacityBelowMinimum {
                max_players,
                min_players,
            } => write!(
                f,
                "max_players ({}) is below min_players ({})",
                max_players, min_players
            ),
            Self::TooFewFaces(n) => write!(f, "A die needs at least 2 faces, got {}", n),
        }
    }
}

impl std::error::Error for ConfigError {}
